use gradevis_core::GradevisError;
use thiserror::Error;

/// Errors produced by [`GradebookStore`](crate::GradebookStore) and
/// [`ScheduleStore`](crate::ScheduleStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for GradevisError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => GradevisError::NotFound { kind, id },
            other => GradevisError::Store(other.to_string()),
        }
    }
}
