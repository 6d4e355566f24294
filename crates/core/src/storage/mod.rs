//! Blob storage using Apache OpenDAL.
//!
//! Attachments and export artifacts live in one vendor-agnostic object
//! store:
//! - S3-compatible: Cloudflare R2, AWS S3, MinIO
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - In-process memory (tests)
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      BlobStore                           │
//! ├──────────────────────────────────────────────────────────┤
//! │ put(path, bytes, type)     │ list(prefix)                │
//! │ get(path)                  │ delete(path)                │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

use async_trait::async_trait;
use bytes::Bytes;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{StorageService, sanitize_filename};

/// A stored object with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Object contents.
    pub bytes: Bytes,
    /// MIME type recorded at upload, when the backend keeps it.
    pub content_type: Option<String>,
}

/// Path-addressed object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` at `path`, replacing any existing object.
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Reads the object at `path`.
    async fn get(&self, path: &str) -> Result<Blob, StorageError>;

    /// Lists object paths below `prefix`, recursively. Directories are not
    /// returned.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Deletes the object at `path`. Deleting a missing object succeeds.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}
