//! Wire and domain types for the training-record backend.
//!
//! Field names are camelCase on the wire (the backend is a spreadsheet
//! script that echoes its sheet headers), and task completion travels as
//! the literal strings `"Yes"` / `"No"`. Everything deserializes with
//! per-field defaults so a sparse spreadsheet row never sinks a whole
//! response.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::util::{self, THAI_MONTHS};

// ---------------------------------------------------------------------------
// Task completion flag
// ---------------------------------------------------------------------------

/// Two-valued completion flag, `"Yes"` / `"No"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    Completed,
    #[default]
    Pending,
}

impl Completion {
    /// The string the backend expects in requests and emits in responses.
    pub fn wire_str(self) -> &'static str {
        match self {
            Self::Completed => "Yes",
            Self::Pending => "No",
        }
    }

    pub fn from_wire(s: &str) -> Self {
        if s.eq_ignore_ascii_case("yes") {
            Self::Completed
        } else {
            Self::Pending
        }
    }

    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Serialize for Completion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_str())
    }
}

impl<'de> Deserialize<'de> for Completion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

impl std::str::FromStr for Completion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" | "completed" | "done" => Ok(Self::Completed),
            "no" | "pending" => Ok(Self::Pending),
            other => Err(format!("unknown status '{other}' (use yes/no)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A training task row. Owned by the backend; the client only ever flips
/// the completion flag through an explicit status update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub assignee: String,
    pub assignee_email: String,
    /// ISO date string, or the `"No Due Date"` sentinel, or empty.
    pub due_date: String,
    pub completed: Completion,
    pub link: String,
}

/// A task surfaced in the upcoming-deadlines panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpcomingTask {
    pub id: String,
    pub name: String,
    pub assignee: String,
    pub due_date: String,
    pub days_until_due: i64,
    pub link: String,
}

// ---------------------------------------------------------------------------
// Training report
// ---------------------------------------------------------------------------

/// A normalized training report, built by form validation and sent once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub task_gid: String,
    pub knowledge_gained: String,
    pub implementation_plan: String,
    pub knowledge_sharing: String,
    /// Optional attachment reference; empty string when absent.
    pub suggestions_images: String,
    /// Submitter identifier (LINE UID).
    pub line_uid: String,
    /// ISO 8601 submission timestamp.
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Dashboard aggregates
// ---------------------------------------------------------------------------

/// Aggregate summary counts for the stat cards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
    pub current_year_tasks: u64,
    pub current_month_tasks: u64,
    pub upcoming_tasks: u64,
    pub unique_assignees: u64,
    /// Percentage, as computed by the backend.
    pub completion_rate: f64,
}

/// Response payload of the summary-statistics operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsPayload {
    pub summary: Summary,
    /// Buddhist-era year the summary was computed for.
    pub current_year: i32,
    pub current_month: u32,
}

impl StatsPayload {
    /// All-zero statistics for the current month/year. Used whenever the
    /// summary fetch fails so the dashboard renders zeros instead of
    /// breaking.
    pub fn fallback() -> Self {
        let now = chrono::Utc::now();
        Self {
            summary: Summary::default(),
            current_year: util::current_buddhist_year(),
            current_month: chrono::Datelike::month(&now),
        }
    }
}

/// One month of the monthly breakdown series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthBucket {
    pub month: String,
    pub month_number: u32,
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

/// Response payload of the monthly-breakdown operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthlyPayload {
    pub monthly_data: Vec<MonthBucket>,
    pub target_year: i32,
}

impl MonthlyPayload {
    /// A full twelve-month zero-filled series for the current BE year.
    pub fn fallback() -> Self {
        let monthly_data = THAI_MONTHS
            .iter()
            .enumerate()
            .map(|(index, month)| MonthBucket {
                month: (*month).to_string(),
                month_number: index as u32 + 1,
                total: 0,
                completed: 0,
                pending: 0,
            })
            .collect();
        Self {
            monthly_data,
            target_year: util::current_buddhist_year(),
        }
    }
}

/// Per-assignee statistics for the staff ranking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStat {
    pub assignee: String,
    pub email: String,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub completion_rate: f64,
}

/// Export response: where to download the generated spreadsheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportFile {
    pub download_url: Option<String>,
    pub filename: Option<String>,
}

/// Result of the external-sync operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncOutcome {
    pub updated: u64,
}

/// The complete in-memory dashboard dataset as of the last load.
/// Wholly replaced on each refresh; never partially mutated.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub stats: StatsPayload,
    pub monthly: MonthlyPayload,
    pub user_stats: Vec<UserStat>,
    pub upcoming: Vec<UpcomingTask>,
    pub tasks: Vec<Task>,
}

impl DashboardSnapshot {
    /// The well-defined default the dashboard falls back to on total
    /// failure: zero statistics, empty lists, a zero-filled year.
    pub fn fallback() -> Self {
        Self {
            stats: StatsPayload::fallback(),
            monthly: MonthlyPayload::fallback(),
            user_stats: Vec::new(),
            upcoming: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// User-selected narrowing criteria for the task list. All fields
/// optional, combined with AND semantics. Year/assignee/month/status are
/// applied by the backend; `search` is additionally applied client-side
/// against task and assignee names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Completion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.assignee.is_none()
            && self.month.is_none()
            && self.status.is_none()
            && self.search.is_none()
    }

    /// The trimmed search term, if one is set and non-blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_round_trips_wire_strings() {
        let completed: Completion = serde_json::from_str("\"Yes\"").unwrap();
        assert!(completed.is_completed());
        let pending: Completion = serde_json::from_str("\"No\"").unwrap();
        assert!(!pending.is_completed());
        assert_eq!(serde_json::to_string(&Completion::Completed).unwrap(), "\"Yes\"");
    }

    #[test]
    fn completion_treats_unknown_strings_as_pending() {
        let flag: Completion = serde_json::from_str("\"maybe\"").unwrap();
        assert!(!flag.is_completed());
    }

    #[test]
    fn task_deserializes_from_sparse_row() {
        let task: Task = serde_json::from_str(
            r#"{"id": "42", "name": "อบรม Active Learning", "completed": "Yes"}"#,
        )
        .unwrap();
        assert_eq!(task.id, "42");
        assert!(task.completed.is_completed());
        assert!(task.assignee.is_empty());
        assert!(task.due_date.is_empty());
    }

    #[test]
    fn monthly_fallback_has_twelve_zero_buckets() {
        let monthly = MonthlyPayload::fallback();
        assert_eq!(monthly.monthly_data.len(), 12);
        assert!(monthly.monthly_data.iter().all(|b| b.total == 0));
        assert_eq!(monthly.monthly_data[0].month, "มกราคม");
        assert_eq!(monthly.monthly_data[11].month_number, 12);
    }

    #[test]
    fn stats_fallback_is_all_zero() {
        let stats = StatsPayload::fallback();
        assert_eq!(stats.summary.total_tasks, 0);
        assert_eq!(stats.summary.completion_rate, 0.0);
        assert!(stats.current_year > 2500); // Buddhist era
    }

    #[test]
    fn filters_serialize_only_set_fields() {
        let filters = FilterSet {
            year: Some(2567),
            status: Some(Completion::Pending),
            ..Default::default()
        };
        let json = serde_json::to_string(&filters).unwrap();
        assert!(json.contains("\"year\":2567"));
        assert!(json.contains("\"status\":\"No\""));
        assert!(!json.contains("assignee"));
        assert!(!json.contains("search"));
    }

    #[test]
    fn search_term_trims_and_drops_blank() {
        let mut filters = FilterSet::default();
        assert_eq!(filters.search_term(), None);
        filters.search = Some("  somchai ".to_string());
        assert_eq!(filters.search_term(), Some("somchai"));
        filters.search = Some("   ".to_string());
        assert_eq!(filters.search_term(), None);
    }
}
