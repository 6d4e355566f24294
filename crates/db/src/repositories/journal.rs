//! Append-only journal repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use claimflow_core::journal::{AuditEntry, JournalError, JournalRepository};
use claimflow_shared::JournalEntryId;
use dashmap::DashMap;

/// Journal repository implementation. Entries are never updated or removed.
#[derive(Debug, Default)]
pub struct JournalStore {
    entries: DashMap<JournalEntryId, AuditEntry>,
}

impl JournalStore {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was journaled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl JournalRepository for JournalStore {
    async fn append(&self, entry: AuditEntry) -> Result<(), JournalError> {
        if self.entries.contains_key(&entry.id) {
            return Err(JournalError::Repository(format!(
                "journal entry {} already exists",
                entry.id
            )));
        }
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    async fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditEntry>, JournalError> {
        let mut entries: Vec<AuditEntry> = self
            .entries
            .iter()
            .filter(|row| row.time >= from && row.time <= to)
            .map(|row| row.value().clone())
            .collect();
        entries.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));
        Ok(entries)
    }
}
