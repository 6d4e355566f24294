//! Reference stores behind the core persistence traits.
//!
//! This crate provides:
//! - An expense repository with per-expense transactions
//! - The append-only journal
//! - Employee directory and cost type repositories
//! - Seed file loading

pub mod repositories;
pub mod seed;

use std::sync::Arc;

pub use repositories::{CostTypeRepository, EmployeeRepository, ExpenseRepository, JournalStore};
pub use seed::{SeedData, SeedError, SeedSummary};

/// All stores of one process.
#[derive(Debug, Clone, Default)]
pub struct Database {
    /// Expense claims.
    pub expenses: Arc<ExpenseRepository>,
    /// Audit journal.
    pub journal: Arc<JournalStore>,
    /// HR records.
    pub employees: Arc<EmployeeRepository>,
    /// Cost types.
    pub cost_types: Arc<CostTypeRepository>,
}

impl Database {
    /// Creates empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
