//! Blob-backed attachment store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use claimflow_shared::ExpenseId;

use super::error::AttachmentError;
use super::types::Attachment;
use super::AttachmentStore;
use crate::storage::{BlobStore, StorageConfig, StorageError, sanitize_filename};

/// Fallback MIME type when the backend does not keep one.
const OCTET_STREAM: &str = "application/octet-stream";

/// Attachment store on top of a [`BlobStore`].
#[derive(Clone)]
pub struct BlobAttachmentStore {
    blobs: Arc<dyn BlobStore>,
    config: StorageConfig,
}

impl BlobAttachmentStore {
    /// Create a new attachment store.
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>, config: StorageConfig) -> Self {
        Self { blobs, config }
    }

    fn prefix(expense_id: ExpenseId) -> String {
        format!("attachments/{expense_id}/")
    }

    fn path(expense_id: ExpenseId, name: &str) -> String {
        format!("attachments/{expense_id}/{name}")
    }
}

fn stored_name(name: &str) -> Result<String, AttachmentError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AttachmentError::InvalidName(name.to_string()));
    }
    Ok(sanitize_filename(trimmed))
}

#[async_trait]
impl AttachmentStore for BlobAttachmentStore {
    async fn exists_for(&self, expense_id: ExpenseId) -> Result<bool, AttachmentError> {
        Ok(!self.list(expense_id).await?.is_empty())
    }

    async fn list(&self, expense_id: ExpenseId) -> Result<Vec<String>, AttachmentError> {
        let prefix = Self::prefix(expense_id);
        let names = self
            .blobs
            .list(&prefix)
            .await?
            .into_iter()
            .filter_map(|path| path.strip_prefix(&prefix).map(str::to_string))
            .collect();
        Ok(names)
    }

    async fn get(&self, expense_id: ExpenseId, name: &str) -> Result<Attachment, AttachmentError> {
        let name = stored_name(name)?;
        let blob = match self.blobs.get(&Self::path(expense_id, &name)).await {
            Ok(blob) => blob,
            Err(StorageError::NotFound { .. }) => {
                return Err(AttachmentError::NotFound { expense_id, name });
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Attachment {
            name,
            content_type: blob.content_type.unwrap_or_else(|| OCTET_STREAM.to_string()),
            bytes: blob.bytes,
        })
    }

    async fn put(
        &self,
        expense_id: ExpenseId,
        name: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, AttachmentError> {
        if bytes.is_empty() {
            return Err(AttachmentError::Empty);
        }
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        self.config.validate_upload(content_type, size)?;

        let name = stored_name(name)?;
        self.blobs
            .put(&Self::path(expense_id, &name), bytes, content_type)
            .await?;

        tracing::info!(%expense_id, name = %name, content_type, size, "Attachment stored");
        Ok(name)
    }

    async fn delete(&self, expense_id: ExpenseId, name: &str) -> Result<(), AttachmentError> {
        let name = stored_name(name)?;
        if !self.list(expense_id).await?.contains(&name) {
            return Err(AttachmentError::NotFound { expense_id, name });
        }
        self.blobs.delete(&Self::path(expense_id, &name)).await?;
        tracing::info!(%expense_id, name = %name, "Attachment deleted");
        Ok(())
    }
}
