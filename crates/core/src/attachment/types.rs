//! Attachment types.

use bytes::Bytes;
use serde::Serialize;

/// A stored receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// File name within the claim.
    pub name: String,
    /// MIME type.
    pub content_type: String,
    /// File contents.
    #[serde(skip)]
    pub bytes: Bytes,
}
