//! Rule draft validation with structured errors and warnings.
//!
//! Errors block saving a rule; warnings are advisory.

use chrono::{DateTime, Utc};
use gradevis_core::{GradevisError, Result, RuleDraft};
use serde::{Deserialize, Serialize};

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field name, e.g. `"course_shortname"`.
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// `Ok` when valid, otherwise a [`GradevisError::Validation`] listing every error.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>> {
        if self.valid {
            return Ok(self.warnings);
        }
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        Err(GradevisError::Validation(messages.join("; ")))
    }
}

// ── Checks ──────────────────────────────────────────────────────────

pub const MISSING_PATTERNS: &str =
    "You must fill at least one of the two fields: Course shortname or Category idnumber.";

/// Validate a rule draft as submitted by an administrator.
pub fn validate_draft(draft: &RuleDraft, now: DateTime<Utc>) -> ValidationResult {
    let mut result = ValidationResult::new();
    let course = draft.course_shortname.trim();
    let category = draft.category_idnumber.trim();

    if course.is_empty() && category.is_empty() {
        result.error_with_suggestion(
            "course_shortname",
            MISSING_PATTERNS,
            "set a course short name pattern, a category idnumber pattern, or both",
        );
        return result;
    }

    if course.is_empty() {
        result.warn(
            "course_shortname",
            "empty course pattern: the rule applies to every course",
        );
    }
    if draft.scheduled_at <= now {
        result.warn(
            "scheduled_at",
            "scheduled time is not in the future: the rule runs on the next tick",
        );
    }
    result
}
