//! Append-only audit journal of expense changes.
//!
//! Every committed mutation of an expense is diffed against its previous
//! snapshot; the resulting entry is never updated or deleted.

mod diff;
mod error;
mod report;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use diff::{AttributeChange, AuditEntry, diff};
pub use error::JournalError;
pub use report::{JournalRow, journal_rows, render_csv};

/// Storage of journal entries.
///
/// Implemented by the db crate.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    /// Appends an entry.
    async fn append(&self, entry: AuditEntry) -> Result<(), JournalError>;

    /// Entries with `from <= time <= to`, oldest first.
    async fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditEntry>, JournalError>;
}
