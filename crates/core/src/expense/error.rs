//! Expense service errors.

use claimflow_shared::{AppError, ExpenseId};
use thiserror::Error;

use crate::attachment::AttachmentError;
use crate::cost_type::CatalogError;
use crate::journal::JournalError;
use crate::workflow::{Role, WorkflowError};

/// Failures of a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No claim with this id.
    #[error("Expense {0} not found")]
    NotFound(ExpenseId),

    /// The backend failed.
    #[error("Store error: {0}")]
    Backend(String),
}

/// Errors from running a create or update.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// No claim with this id, or not visible to the caller.
    #[error("Expense {0} not found")]
    NotFound(ExpenseId),

    /// The caller is not in the employee directory.
    #[error("Employee {0} not found in the personnel records")]
    UnknownEmployee(String),

    /// The caller lacks the scope for the role.
    #[error("Role {0} is not granted to the caller")]
    RoleNotGranted(Role),

    /// Attachments can only be changed by the owner of an editable claim.
    #[error("Attachments of expense {0} cannot be changed")]
    AttachmentsLocked(ExpenseId),

    /// Transition or validation failure.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Cost type lookup failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Attachment storage failure.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Journal failure.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Store failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ExpenseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

impl ExpenseError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::UnknownEmployee(_) => 404,
            Self::RoleNotGranted(_) | Self::AttachmentsLocked(_) => 403,
            Self::Workflow(err) => err.status_code(),
            Self::Catalog(err) => err.status_code(),
            Self::Attachment(err) => err.status_code(),
            Self::Journal(err) => err.status_code(),
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UnknownEmployee(_) => "UNKNOWN_EMPLOYEE",
            Self::RoleNotGranted(_) => "FORBIDDEN",
            Self::AttachmentsLocked(_) => "ATTACHMENTS_LOCKED",
            Self::Workflow(err) => err.error_code(),
            Self::Catalog(err) => err.error_code(),
            Self::Attachment(err) => err.error_code(),
            Self::Journal(err) => err.error_code(),
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            400 | 413 => Self::Validation(message),
            403 if err.error_code() == "UNAUTHORIZED_TRANSITION" => {
                Self::UnauthorizedTransition(message)
            }
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Internal(message),
        }
    }
}
