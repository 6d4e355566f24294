//! Journal error types.

use thiserror::Error;

/// Errors from the audit journal.
#[derive(Debug, Error)]
pub enum JournalError {
    /// An expense snapshot could not be serialized for diffing.
    #[error("Failed to serialize expense snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rendering the journal report failed.
    #[error("Failed to render journal report: {0}")]
    Render(String),

    /// The backing repository failed.
    #[error("Journal repository error: {0}")]
    Repository(String),
}

impl JournalError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        500
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Render(_) => "RENDER_ERROR",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }
}
