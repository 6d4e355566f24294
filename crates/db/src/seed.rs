//! Preloading reference data from a JSON seed file.
//!
//! ```json
//! {
//!   "cost_types": [{ "id": "430110", "ledger_account": "430110" }],
//!   "employees": [{ "email": "jan@example.com", "employee_number": "2001", ... }],
//!   "expenses": []
//! }
//! ```

use std::path::Path;

use claimflow_core::cost_type::CostType;
use claimflow_core::expense::{EmployeeRecord, Expense};
use serde::Deserialize;
use thiserror::Error;

use crate::Database;

/// Seed loading errors.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        /// Seed file path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid seed JSON.
    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Contents of a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    /// Cost types.
    #[serde(default)]
    pub cost_types: Vec<CostType>,
    /// HR records with their email.
    #[serde(default)]
    pub employees: Vec<SeedEmployee>,
    /// Existing claims, kept with their ids.
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

/// An HR record keyed by email.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEmployee {
    /// Email / UPN.
    pub email: String,
    /// The HR record.
    #[serde(flatten)]
    pub record: EmployeeRecord,
}

/// What a seed run loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// Cost types loaded.
    pub cost_types: usize,
    /// Employees loaded.
    pub employees: usize,
    /// Claims loaded.
    pub expenses: usize,
}

impl SeedData {
    /// Parses seed JSON.
    ///
    /// # Errors
    ///
    /// `SeedError::Parse` for malformed input.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a seed file.
    ///
    /// # Errors
    ///
    /// `SeedError::Io` if the file cannot be read, `SeedError::Parse` if it
    /// is malformed.
    pub async fn from_file(path: &Path) -> Result<Self, SeedError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SeedError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&json)
    }

    /// Loads everything into `db`, replacing entries with the same key.
    pub fn apply(self, db: &Database) -> SeedSummary {
        let summary = SeedSummary {
            cost_types: self.cost_types.len(),
            employees: self.employees.len(),
            expenses: self.expenses.len(),
        };
        for cost_type in self.cost_types {
            db.cost_types.upsert(cost_type);
        }
        for employee in self.employees {
            db.employees.upsert(&employee.email, employee.record);
        }
        for expense in self.expenses {
            db.expenses.insert(expense);
        }
        tracing::info!(
            cost_types = summary.cost_types,
            employees = summary.employees,
            expenses = summary.expenses,
            "Seed data loaded"
        );
        summary
    }
}
