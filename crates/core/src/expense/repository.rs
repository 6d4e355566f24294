//! Persistence seams of the expense service.
//!
//! Implemented by the db crate.

use async_trait::async_trait;
use claimflow_shared::ExpenseId;

use super::error::StoreError;
use super::types::{EmployeeRecord, Expense, ExpenseFilter};

/// Committed expense snapshots.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Stores a new claim under a fresh id and returns it with that id.
    async fn create(&self, expense: Expense) -> Result<Expense, StoreError>;

    /// Reads the committed snapshot.
    async fn get(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError>;

    /// Opens a read-modify-write transaction on one claim.
    ///
    /// Holds the claim exclusively until the transaction is committed or
    /// dropped.
    async fn begin(&self, id: ExpenseId) -> Result<Box<dyn ExpenseTransaction>, StoreError>;

    /// Committed snapshots matching `filter`, ordered by id.
    async fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, StoreError>;
}

/// An exclusive hold on one claim.
///
/// Dropping it without [`commit`](ExpenseTransaction::commit) writes
/// nothing.
///
/// The journal is not part of the transaction. Callers append the entry
/// only after `commit` succeeds, so a failed commit leaves no entry, while a
/// journal failure after a successful commit surfaces as an error on a claim
/// that did change.
#[async_trait]
pub trait ExpenseTransaction: Send {
    /// Snapshot as read when the transaction began.
    fn current(&self) -> &Expense;

    /// Replaces the snapshot and releases the hold.
    async fn commit(self: Box<Self>, expense: Expense) -> Result<(), StoreError>;
}

/// HR records by email.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up the employee behind `email`.
    async fn get_employee(&self, email: &str) -> Result<Option<EmployeeRecord>, StoreError>;
}
