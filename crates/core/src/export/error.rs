//! Export pipeline errors.

use std::fmt;

use claimflow_shared::AppError;
use thiserror::Error;

use crate::expense::StoreError;
use crate::journal::JournalError;
use crate::storage::StorageError;

/// Which artifacts of a run could not be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedArtifact {
    /// The booking CSV.
    Booking,
    /// The payment XML.
    Payment,
    /// Both files.
    Both,
}

impl FailedArtifact {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Payment => "payment",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for FailedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from an export run or document retrieval.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No approved claims.
    #[error("Nothing to export")]
    NothingToExport,

    /// Another run holds the export lock.
    #[error("An export run is already in progress")]
    AlreadyRunning,

    /// Uploading one or both artifacts failed; nothing was exported.
    #[error("Export artifact upload failed: {failed}")]
    ArtifactUpload {
        /// Which artifacts failed.
        failed: FailedArtifact,
    },

    /// Rendering an artifact failed.
    #[error("Failed to render export file: {0}")]
    Render(String),

    /// Unknown document kind.
    #[error("Unknown document kind: {0}")]
    UnknownKind(String),

    /// Malformed run id.
    #[error("Invalid export run id: {0}")]
    InvalidRunId(String),

    /// No stored document for this run and kind.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Storage failure outside the upload stage.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Expense store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Journal failure.
    #[error(transparent)]
    Journal(#[from] JournalError),
}

impl ExportError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NothingToExport => 204,
            Self::AlreadyRunning => 409,
            Self::ArtifactUpload { .. } => 502,
            Self::UnknownKind(_) | Self::InvalidRunId(_) => 400,
            Self::DocumentNotFound(_) => 404,
            Self::Storage(err) => err.status_code(),
            Self::Render(_) | Self::Store(_) | Self::Journal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NothingToExport => "NOTHING_TO_EXPORT",
            Self::AlreadyRunning => "EXPORT_RUNNING",
            Self::ArtifactUpload { .. } => "EXPORT_ARTIFACT_FAILURE",
            Self::Render(_) => "RENDER_ERROR",
            Self::UnknownKind(_) => "UNKNOWN_DOCUMENT_KIND",
            Self::InvalidRunId(_) => "INVALID_RUN_ID",
            Self::DocumentNotFound(_) => "NOT_FOUND",
            Self::Storage(err) => err.error_code(),
            Self::Store(_) => "STORE_ERROR",
            Self::Journal(err) => err.error_code(),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            400 => Self::Validation(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            502 => Self::ExportArtifact(message),
            _ => Self::Internal(message),
        }
    }
}
