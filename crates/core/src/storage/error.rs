//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File size exceeds maximum allowed.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// MIME type not allowed.
    #[error("MIME type '{mime_type}' is not allowed")]
    InvalidMimeType {
        /// The invalid MIME type.
        mime_type: String,
    },

    /// Object not found in storage.
    #[error("file not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),

    /// Invalid storage key format.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create an invalid MIME type error.
    #[must_use]
    pub fn invalid_mime_type(mime_type: impl Into<String>) -> Self {
        Self::InvalidMimeType {
            mime_type: mime_type.into(),
        }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::FileTooLarge { .. } => 413,
            Self::InvalidMimeType { .. } | Self::InvalidKey(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Configuration(_) | Self::Operation(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::InvalidMimeType { .. } => "INVALID_MIME_TYPE",
            Self::InvalidKey(_) => "INVALID_STORAGE_KEY",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Configuration(_) | Self::Operation(_) => "STORAGE_ERROR",
        }
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StorageError::file_too_large(2, 1).status_code(), 413);
        assert_eq!(StorageError::invalid_mime_type("text/html").status_code(), 400);
        assert_eq!(StorageError::not_found("a/b").status_code(), 404);
        assert_eq!(StorageError::operation("boom").status_code(), 500);
        assert_eq!(StorageError::operation("boom").error_code(), "STORAGE_ERROR");
    }
}
