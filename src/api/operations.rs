//! The fixed catalogue of remote operations.
//!
//! Each wrapper shapes a parameter object, names the action, and decodes
//! the data payload into its domain type. This module is the full
//! contract boundary with the backend — tests mock at this surface.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use super::{ApiClient, ApiError};
use crate::model::{
    Completion, ExportFile, FilterSet, MonthlyPayload, StatsPayload, SyncOutcome, Task,
    TrainingReport, UpcomingTask, UserStat,
};

impl ApiClient {
    /// Summary statistics for the stat cards, with an upcoming-task
    /// lookahead window in days.
    pub fn dashboard_stats(&self, days: u32) -> Result<StatsPayload, ApiError> {
        let value = self.call("getDashboardStats", params([("days", json!(days))]))?;
        decode(value)
    }

    /// Monthly breakdown series. Without a year the backend reports the
    /// current Buddhist-era year.
    pub fn monthly_stats(&self, year: Option<i32>) -> Result<MonthlyPayload, ApiError> {
        let mut map = Map::new();
        if let Some(year) = year {
            map.insert("year".to_string(), json!(year));
        }
        let value = self.call("getMonthlyStats", map)?;
        decode(value)
    }

    /// Per-assignee totals and completion rates.
    pub fn user_statistics(&self) -> Result<Vec<UserStat>, ApiError> {
        let value = self.call("getUserStatistics", Map::new())?;
        decode_list(value)
    }

    /// Tasks due within the lookahead window.
    pub fn upcoming_tasks(&self, days: u32) -> Result<Vec<UpcomingTask>, ApiError> {
        let value = self.call("getUpcomingTasks", params([("days", json!(days))]))?;
        decode_list(value)
    }

    /// The task list narrowed by the server-side filters.
    pub fn training_tasks(&self, filters: &FilterSet) -> Result<Vec<Task>, ApiError> {
        let value = self.call(
            "getTrainingTasks",
            params([("filters", to_param(filters)?)]),
        )?;
        decode_list(value)
    }

    /// Submit a normalized training report. The receipt payload (row
    /// number, document link) varies by backend version and is returned
    /// raw.
    pub fn save_training_report(&self, report: &TrainingReport) -> Result<Value, ApiError> {
        let Value::Object(fields) = to_param(report)? else {
            return Err(ApiError::server("report did not serialize to an object"));
        };
        self.call("saveTrainingReport", fields)
    }

    /// Flip a task's completion flag.
    pub fn update_task_status(&self, task_id: &str, status: Completion) -> Result<(), ApiError> {
        self.call(
            "updateTaskStatus",
            params([
                ("taskId", json!(task_id)),
                ("status", json!(status.wire_str())),
            ]),
        )?;
        Ok(())
    }

    /// Ask the backend to build a spreadsheet export of the filtered task
    /// list; returns the download URL and suggested filename.
    pub fn export_to_excel(&self, filters: &FilterSet) -> Result<ExportFile, ApiError> {
        let value = self.call("exportToExcel", params([("filters", to_param(filters)?)]))?;
        decode(value)
    }

    /// Trigger the external Asana sync; returns how many records changed.
    pub fn sync_from_asana(&self) -> Result<SyncOutcome, ApiError> {
        let value = self.call("syncFromAsana", Map::new())?;
        decode(value)
    }
}

// ---------------------------------------------------------------------------
// Shaping and decoding helpers
// ---------------------------------------------------------------------------

fn params<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn to_param<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::server(format!("failed to serialize parameters: {e}")))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::server(format!("unexpected response shape: {e}")))
}

/// Decode a list payload. Older backend versions wrap list responses in
/// one more `{data: [...]}` layer; accept both.
fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) => decode(inner),
            None => Err(ApiError::server("unexpected response shape: not a list")),
        },
        other => decode(other),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_list_accepts_bare_arrays() {
        let tasks: Vec<Task> = decode_list(json!([{"id": "1", "name": "x"}])).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "1");
    }

    #[test]
    fn decode_list_unwraps_data_layer() {
        let tasks: Vec<Task> = decode_list(json!({"data": [{"id": "2"}]})).unwrap();
        assert_eq!(tasks[0].id, "2");
    }

    #[test]
    fn decode_list_rejects_other_objects() {
        let result: Result<Vec<Task>, _> = decode_list(json!({"rows": []}));
        assert!(result.is_err());
    }

    #[test]
    fn params_builds_object_in_order() {
        let map = params([("days", json!(7))]);
        assert_eq!(map.get("days"), Some(&json!(7)));
    }
}
