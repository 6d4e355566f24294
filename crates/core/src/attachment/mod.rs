//! Receipts attached to expense claims.
//!
//! Attachments are blobs below `attachments/{expense_id}/`. A claim needs
//! at least one before it can be submitted.

mod error;
mod service;
mod types;

use async_trait::async_trait;
use bytes::Bytes;
use claimflow_shared::ExpenseId;

pub use error::AttachmentError;
pub use service::BlobAttachmentStore;
pub use types::Attachment;

/// Storage of claim attachments.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Returns true if at least one attachment is stored for the claim.
    async fn exists_for(&self, expense_id: ExpenseId) -> Result<bool, AttachmentError>;

    /// Names of the claim's attachments, sorted.
    async fn list(&self, expense_id: ExpenseId) -> Result<Vec<String>, AttachmentError>;

    /// Reads one attachment.
    async fn get(&self, expense_id: ExpenseId, name: &str) -> Result<Attachment, AttachmentError>;

    /// Stores an attachment and returns its stored name.
    async fn put(
        &self,
        expense_id: ExpenseId,
        name: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, AttachmentError>;

    /// Removes an attachment.
    async fn delete(&self, expense_id: ExpenseId, name: &str) -> Result<(), AttachmentError>;
}
