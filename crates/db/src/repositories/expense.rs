//! Expense repository with per-expense transactions.
//!
//! Committed snapshots and per-expense locks live in separate maps, so
//! reads never wait for an open transaction.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use claimflow_core::expense::{Expense, ExpenseFilter, ExpenseStore, ExpenseTransaction, StoreError};
use claimflow_shared::ExpenseId;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Expense repository implementation.
#[derive(Debug)]
pub struct ExpenseRepository {
    snapshots: Arc<DashMap<ExpenseId, Expense>>,
    locks: DashMap<ExpenseId, Arc<Mutex<()>>>,
    next_id: AtomicI64,
}

impl Default for ExpenseRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseRepository {
    /// Create an empty repository; the first claim gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(DashMap::new()),
            locks: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Stores a claim under its own id, e.g. from seed data.
    ///
    /// Later claims are numbered above the highest id seen.
    pub fn insert(&self, expense: Expense) {
        let id = expense.id;
        self.next_id.fetch_max(id.into_inner() + 1, Ordering::SeqCst);
        self.locks.entry(id).or_default();
        self.snapshots.insert(id, expense);
    }

    /// Committed snapshot of one claim.
    #[must_use]
    pub fn get_snapshot(&self, id: ExpenseId) -> Option<Expense> {
        self.snapshots.get(&id).map(|row| row.value().clone())
    }

    /// Number of stored claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if no claim is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    fn lock_for(&self, id: ExpenseId) -> Option<Arc<Mutex<()>>> {
        self.locks.get(&id).map(|lock| Arc::clone(lock.value()))
    }
}

#[async_trait]
impl ExpenseStore for ExpenseRepository {
    async fn create(&self, mut expense: Expense) -> Result<Expense, StoreError> {
        expense.id = ExpenseId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.locks.insert(expense.id, Arc::new(Mutex::new(())));
        self.snapshots.insert(expense.id, expense.clone());
        tracing::debug!(expense_id = %expense.id, "Expense stored");
        Ok(expense)
    }

    async fn get(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        Ok(self.get_snapshot(id))
    }

    async fn begin(&self, id: ExpenseId) -> Result<Box<dyn ExpenseTransaction>, StoreError> {
        let lock = self.lock_for(id).ok_or(StoreError::NotFound(id))?;
        let guard = lock.lock_owned().await;

        // read after acquiring, so the snapshot includes the previous commit
        let current = self
            .snapshots
            .get(&id)
            .map(|row| row.value().clone())
            .ok_or(StoreError::NotFound(id))?;

        Ok(Box::new(Transaction {
            current,
            snapshots: Arc::clone(&self.snapshots),
            _guard: guard,
        }))
    }

    async fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, StoreError> {
        let mut expenses: Vec<Expense> = self
            .snapshots
            .iter()
            .filter(|row| filter.matches(row.value()))
            .map(|row| row.value().clone())
            .collect();
        expenses.sort_by_key(|expense| expense.id);
        Ok(expenses)
    }
}

/// Exclusive hold on one claim until commit or drop.
struct Transaction {
    current: Expense,
    snapshots: Arc<DashMap<ExpenseId, Expense>>,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl ExpenseTransaction for Transaction {
    fn current(&self) -> &Expense {
        &self.current
    }

    async fn commit(self: Box<Self>, expense: Expense) -> Result<(), StoreError> {
        if expense.id != self.current.id {
            return Err(StoreError::Backend(format!(
                "transaction on expense {} cannot commit expense {}",
                self.current.id, expense.id
            )));
        }
        self.snapshots.insert(expense.id, expense);
        Ok(())
    }
}
