use thiserror::Error;

use crate::matcher::MatchType;

#[derive(Error, Debug)]
pub enum GradevisError {
    /// No course short name matched the rule's course pattern.
    #[error("No course found for the rule (shortname: {pattern}, match type: {match_type})")]
    NoCourseMatched {
        pattern: String,
        match_type: MatchType,
    },

    /// A MUST-exist lookup came back empty (broken referential integrity).
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

impl GradevisError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        GradevisError::NotFound { kind, id }
    }
}

pub type Result<T> = std::result::Result<T, GradevisError>;
