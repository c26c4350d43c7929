//! Service-level errors for the tool surface.

use thiserror::Error;

use podcaster_core::JobStoreError;
use podcaster_pipeline::TaskError;

/// Errors surfaced to tool callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The arguments failed validation or deserialization.
    #[error("invalid arguments: {0}")]
    InvalidParams(String),

    /// All generation slots are in use; the caller should retry shortly.
    #[error("{0}")]
    Busy(String),

    /// The referenced podcast does not exist.
    #[error("podcast '{0}' not found")]
    NotFound(String),

    /// The tool name is unknown.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TaskError> for ServiceError {
    fn from(error: TaskError) -> Self {
        match error {
            TaskError::Busy { .. } | TaskError::ShuttingDown => Self::Busy(error.to_string()),
            TaskError::InvalidRequest(message) => Self::InvalidParams(message),
            TaskError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<JobStoreError> for ServiceError {
    fn from(error: JobStoreError) -> Self {
        match error {
            JobStoreError::NotFound(id) => Self::NotFound(id),
            JobStoreError::Storage(message) => Self::Internal(message),
        }
    }
}
