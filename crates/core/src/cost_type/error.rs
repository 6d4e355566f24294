//! Cost type catalog errors.

use thiserror::Error;

/// Errors from resolving cost types.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No cost type with this id.
    #[error("Unknown cost type: {0}")]
    Unknown(String),

    /// The cost type exists but may not be chosen.
    #[error("Inactive cost type: {0}")]
    Inactive(String),

    /// The backing repository failed.
    #[error("Cost type repository error: {0}")]
    Repository(String),
}

impl CatalogError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unknown(_) | Self::Inactive(_) => 400,
            Self::Repository(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unknown(_) => "UNKNOWN_COST_TYPE",
            Self::Inactive(_) => "INACTIVE_COST_TYPE",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }
}
