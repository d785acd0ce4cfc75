//! JSON API handlers for the embedded dashboard.
//!
//! Thin proxies over the operations catalogue: parse query parameters,
//! invoke the client (which brings its own retry policy), and wrap the
//! result. The error taxonomy travels as `{error, kind}` so the frontend
//! can distinguish connectivity problems from server-reported ones.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use super::content_type_json;
use crate::api::{ApiClient, ApiError};
use crate::config::TraindashConfig;
use crate::dashboard::{self, LoadOptions};
use crate::forms::{self, ReportForm};
use crate::model::{Completion, FilterSet};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Build a JSON failure response carrying the typed kind.
fn error_response(err: &ApiError) -> Result<Response<Cursor<Vec<u8>>>> {
    let status = if err.is_connectivity() { 502 } else { 500 };
    let body = serde_json::json!({
        "error": err.message,
        "kind": format!("{:?}", err.kind).to_lowercase(),
    })
    .to_string();
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status)))
}

fn api_result<T: Serialize>(result: Result<T, ApiError>) -> Result<Response<Cursor<Vec<u8>>>> {
    match result {
        Ok(data) => json_response(&data),
        Err(err) => error_response(&err),
    }
}

/// Extract one query parameter (percent-decoding not needed for the
/// numeric and plain-word parameters these endpoints take).
fn query_param(url: &str, key: &str) -> Option<String> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key && !v.is_empty() {
            Some(v.replace('+', " "))
        } else {
            None
        }
    })
}

fn parse_u32(url: &str, key: &str) -> Option<u32> {
    query_param(url, key)?.parse().ok()
}

/// Assemble a [`FilterSet`] from the standard filter query parameters.
fn filters_from_url(url: &str) -> FilterSet {
    FilterSet {
        year: query_param(url, "year").and_then(|y| y.parse().ok()),
        assignee: query_param(url, "assignee"),
        month: parse_u32(url, "month"),
        status: query_param(url, "status").map(|s| Completion::from_wire(&s)),
        search: query_param(url, "search"),
    }
}

// ---------------------------------------------------------------------------
// Dashboard data
// ---------------------------------------------------------------------------

/// `GET /api/stats?days=N` — summary statistics.
pub fn get_stats(
    client: &ApiClient,
    config: &TraindashConfig,
    url: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let days = parse_u32(url, "days").unwrap_or(config.dashboard.upcoming_days);
    api_result(client.dashboard_stats(days))
}

/// `GET /api/monthly?year=Y` — monthly breakdown series.
pub fn get_monthly(client: &ApiClient, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let year = query_param(url, "year").and_then(|y| y.parse().ok());
    api_result(client.monthly_stats(year))
}

/// `GET /api/users` — per-assignee statistics.
pub fn get_users(client: &ApiClient) -> Result<Response<Cursor<Vec<u8>>>> {
    api_result(client.user_statistics())
}

/// `GET /api/upcoming?days=N` — tasks due within the window.
pub fn get_upcoming(
    client: &ApiClient,
    config: &TraindashConfig,
    url: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let days = parse_u32(url, "days").unwrap_or(config.dashboard.upcoming_days);
    api_result(client.upcoming_tasks(days))
}

/// `GET /api/tasks?year=&assignee=&month=&status=&search=` — filtered
/// task list.
pub fn get_tasks(client: &ApiClient, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let filters = filters_from_url(url);
    api_result(client.training_tasks(&filters))
}

/// `GET /api/snapshot?days=N&year=Y` — the full aggregate, with each
/// failed branch already replaced by its default.
pub fn get_snapshot(
    client: &ApiClient,
    config: &TraindashConfig,
    url: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let options = LoadOptions {
        upcoming_days: parse_u32(url, "days").unwrap_or(config.dashboard.upcoming_days),
        year: query_param(url, "year").and_then(|y| y.parse().ok()),
    };
    let filters = filters_from_url(url);
    let (snapshot, outcome) = dashboard::load_full(client, &filters, &options);

    let body = serde_json::json!({
        "stats": snapshot.stats,
        "monthly": snapshot.monthly,
        "userStats": snapshot.user_stats,
        "upcoming": snapshot.upcoming,
        "tasks": snapshot.tasks,
        "degraded": !outcome.fully_loaded(),
    });
    json_response(&body)
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Report submission body for `POST /api/reports`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ReportRequest {
    task_gid: Option<String>,
    knowledge_gained: String,
    implementation_plan: String,
    knowledge_sharing: String,
    suggestions_images: Option<String>,
    line_uid: String,
    timestamp: Option<String>,
}

/// `POST /api/reports` — validate and submit a training report.
///
/// Validation failures come back as 422 with every missing label, before
/// any backend traffic.
pub fn post_report(client: &ApiClient, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ReportRequest =
        serde_json::from_str(body).context("invalid JSON in report request")?;

    let form = ReportForm {
        task_gid: req.task_gid,
        knowledge_gained: req.knowledge_gained,
        implementation_plan: req.implementation_plan,
        knowledge_sharing: req.knowledge_sharing,
        suggestions_images: req.suggestions_images,
        line_uid: req.line_uid,
        timestamp: req.timestamp,
    };

    let report = match forms::validate(&form) {
        Ok(report) => report,
        Err(validation) => {
            let body = serde_json::json!({
                "error": validation.to_string(),
                "missing": validation.missing,
            })
            .to_string();
            return Ok(Response::from_data(body.into_bytes())
                .with_header(content_type_json())
                .with_status_code(StatusCode(422)));
        }
    };

    match client.save_training_report(&report) {
        Ok(receipt) => json_response(&serde_json::json!({
            "saved": true,
            "taskGid": report.task_gid,
            "receipt": receipt,
        })),
        Err(err) => error_response(&err),
    }
}

/// Completion body for `POST /api/complete`.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest {
    task_id: String,
}

/// `POST /api/complete` — mark a task completed.
pub fn post_complete(client: &ApiClient, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: CompleteRequest =
        serde_json::from_str(body).context("invalid JSON in completion request")?;

    match client.update_task_status(&req.task_id, Completion::Completed) {
        Ok(()) => json_response(&serde_json::json!({ "updated": true })),
        Err(err) => error_response(&err),
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// `GET /api/health` — endpoint/config status without a backend call.
pub fn get_health(
    client: &ApiClient,
    config: &TraindashConfig,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::json!({
        "endpoint": client.endpoint(),
        "online": client.is_online(),
        "callbackOnly": config.api.callback_only,
        "retryAttempts": config.api.retry_attempts,
        "timeoutMs": config.api.timeout_ms,
    });
    json_response(&body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_extraction() {
        assert_eq!(parse_u32("/api/stats?days=7", "days"), Some(7));
        assert_eq!(parse_u32("/api/stats?foo=1&days=30", "days"), Some(30));
        assert_eq!(parse_u32("/api/stats", "days"), None);
        assert_eq!(parse_u32("/api/stats?days=abc", "days"), None);
        assert_eq!(parse_u32("/api/stats?days=", "days"), None);
    }

    #[test]
    fn filters_from_url_maps_all_fields() {
        let filters =
            filters_from_url("/api/tasks?year=2567&assignee=Somchai&month=6&status=No&search=stem");
        assert_eq!(filters.year, Some(2567));
        assert_eq!(filters.assignee.as_deref(), Some("Somchai"));
        assert_eq!(filters.month, Some(6));
        assert_eq!(filters.status, Some(Completion::Pending));
        assert_eq!(filters.search.as_deref(), Some("stem"));
    }

    #[test]
    fn filters_from_url_defaults_to_empty() {
        assert!(filters_from_url("/api/tasks").is_empty());
    }

    #[test]
    fn report_request_deserializes_sparse_body() {
        let req: ReportRequest = serde_json::from_str(r#"{"lineUid": "U1"}"#).unwrap();
        assert_eq!(req.line_uid, "U1");
        assert!(req.task_gid.is_none());
    }
}
