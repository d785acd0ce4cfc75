//! Training-report form validation and normalization.
//!
//! Validation runs entirely locally: a submission with any required field
//! blank (after trimming) is rejected with every missing label in one
//! message, and no network call is made. A valid form normalizes into a
//! [`TrainingReport`] ready for the save operation.

use chrono::Utc;

use crate::model::TrainingReport;
use crate::util;

/// Raw form input as collected from flags or the web form.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    /// Pre-existing task context, when the form was opened from a task row.
    pub task_gid: Option<String>,
    pub knowledge_gained: String,
    pub implementation_plan: String,
    pub knowledge_sharing: String,
    /// Optional attachment reference.
    pub suggestions_images: Option<String>,
    /// Submitter identifier.
    pub line_uid: String,
    /// ISO timestamp override; defaults to now.
    pub timestamp: Option<String>,
}

/// All required fields found blank, by display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "please fill in: {}", self.missing.join(", "))
    }
}

impl std::error::Error for ValidationError {}

const KNOWLEDGE_GAINED_LABEL: &str = "knowledge gained";
const IMPLEMENTATION_PLAN_LABEL: &str = "implementation plan";
const KNOWLEDGE_SHARING_LABEL: &str = "knowledge sharing";
const LINE_UID_LABEL: &str = "LINE UID";

/// Validate and normalize a report form.
///
/// Normalization: trims every text field, defaults the attachment to the
/// empty string, generates a task identifier when the form carried no
/// task context, and stamps the submission time when none was supplied.
pub fn validate(form: &ReportForm) -> Result<TrainingReport, ValidationError> {
    let mut missing = Vec::new();
    let required = [
        (form.knowledge_gained.as_str(), KNOWLEDGE_GAINED_LABEL),
        (form.implementation_plan.as_str(), IMPLEMENTATION_PLAN_LABEL),
        (form.knowledge_sharing.as_str(), KNOWLEDGE_SHARING_LABEL),
        (form.line_uid.as_str(), LINE_UID_LABEL),
    ];
    for (value, label) in required {
        if value.trim().is_empty() {
            missing.push(label);
        }
    }
    if !missing.is_empty() {
        return Err(ValidationError { missing });
    }

    Ok(TrainingReport {
        task_gid: form
            .task_gid
            .as_deref()
            .map(str::trim)
            .filter(|gid| !gid.is_empty())
            .map(str::to_string)
            .unwrap_or_else(util::generate_task_gid),
        knowledge_gained: form.knowledge_gained.trim().to_string(),
        implementation_plan: form.implementation_plan.trim().to_string(),
        knowledge_sharing: form.knowledge_sharing.trim().to_string(),
        suggestions_images: form
            .suggestions_images
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string(),
        line_uid: form.line_uid.trim().to_string(),
        timestamp: form
            .timestamp
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| Utc::now().to_rfc3339()),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> ReportForm {
        ReportForm {
            task_gid: Some("1209".to_string()),
            knowledge_gained: "  เทคนิค Active Learning  ".to_string(),
            implementation_plan: "ใช้ในคาบวิทยาการคำนวณ".to_string(),
            knowledge_sharing: "PLC กลุ่มสาระ".to_string(),
            suggestions_images: None,
            line_uid: " U1234abcd ".to_string(),
            timestamp: Some("2024-06-01T09:00:00Z".to_string()),
        }
    }

    #[test]
    fn all_missing_fields_reported_in_one_error() {
        let err = validate(&ReportForm::default()).unwrap_err();
        assert_eq!(err.missing.len(), 4);
        let message = err.to_string();
        assert!(message.contains("knowledge gained"));
        assert!(message.contains("LINE UID"));
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let mut form = filled_form();
        form.knowledge_sharing = "   \n ".to_string();
        let err = validate(&form).unwrap_err();
        assert_eq!(err.missing, vec![super::KNOWLEDGE_SHARING_LABEL]);
    }

    #[test]
    fn valid_form_normalizes_fields() {
        let report = validate(&filled_form()).unwrap();
        assert_eq!(report.task_gid, "1209");
        assert_eq!(report.knowledge_gained, "เทคนิค Active Learning");
        assert_eq!(report.line_uid, "U1234abcd");
        assert_eq!(report.suggestions_images, "");
        assert_eq!(report.timestamp, "2024-06-01T09:00:00Z");
    }

    #[test]
    fn missing_task_context_generates_an_id() {
        let mut form = filled_form();
        form.task_gid = None;
        let report = validate(&form).unwrap();
        assert!(report.task_gid.starts_with("TASK-"));

        form.task_gid = Some("  ".to_string());
        let report = validate(&form).unwrap();
        assert!(report.task_gid.starts_with("TASK-"));
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let mut form = filled_form();
        form.timestamp = None;
        let report = validate(&form).unwrap();
        assert!(report.timestamp.contains('T'));
    }
}
