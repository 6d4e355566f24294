//! Storage configuration types.

pub use claimflow_shared::config::StorageProvider;

use super::error::StorageError;

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Maximum attachment size in bytes.
    pub max_file_size: u64,
    /// Allowed MIME types for attachments.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Self::default_mime_types(),
        }
    }

    /// In-memory storage with default limits.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(StorageProvider::Memory)
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set allowed MIME types.
    #[must_use]
    pub fn with_allowed_mime_types(mut self, types: Vec<String>) -> Self {
        self.allowed_mime_types = types;
        self
    }

    /// Default allowed MIME types for receipts.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        vec![
            // Documents
            "application/pdf".to_string(),
            // Images
            "image/png".to_string(),
            "image/jpeg".to_string(),
            "image/gif".to_string(),
            "image/webp".to_string(),
            "image/heic".to_string(),
        ]
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|t| t == mime_type)
    }

    /// Validate an upload against the size and MIME type limits.
    ///
    /// # Errors
    ///
    /// `FileTooLarge` or `InvalidMimeType`.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.max_file_size {
            return Err(StorageError::file_too_large(size, self.max_file_size));
        }
        if !self.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }
        Ok(())
    }
}
