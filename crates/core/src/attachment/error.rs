//! Attachment error types.

use claimflow_shared::ExpenseId;
use thiserror::Error;

use crate::storage::StorageError;

/// Attachment operation errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Attachment not found.
    #[error("attachment '{name}' not found for expense {expense_id}")]
    NotFound {
        /// Owning claim.
        expense_id: ExpenseId,
        /// Requested name.
        name: String,
    },

    /// Name that cannot be stored.
    #[error("invalid attachment name: {0}")]
    InvalidName(String),

    /// Empty upload.
    #[error("attachment is empty")]
    Empty,

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AttachmentError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidName(_) | Self::Empty => 400,
            Self::Storage(err) => err.status_code(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "ATTACHMENT_NOT_FOUND",
            Self::InvalidName(_) => "INVALID_ATTACHMENT_NAME",
            Self::Empty => "EMPTY_ATTACHMENT",
            Self::Storage(err) => err.error_code(),
        }
    }
}
