//! Employee directory keyed by email.

use async_trait::async_trait;
use claimflow_core::expense::{EmployeeDirectory, EmployeeRecord, StoreError};
use dashmap::DashMap;

/// Employee repository implementation. Lookups ignore email case.
#[derive(Debug, Default)]
pub struct EmployeeRepository {
    employees: DashMap<String, EmployeeRecord>,
}

impl EmployeeRepository {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the record behind `email`.
    pub fn upsert(&self, email: &str, record: EmployeeRecord) {
        self.employees.insert(email.to_lowercase(), record);
    }

    /// Number of known employees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Returns true if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

#[async_trait]
impl EmployeeDirectory for EmployeeRepository {
    async fn get_employee(&self, email: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        Ok(self
            .employees
            .get(&email.to_lowercase())
            .map(|row| row.value().clone()))
    }
}
