//! Expense claims: the aggregate, its collaborators, and the service that
//! runs one create or update end to end.

mod error;
mod repository;
mod service;
mod types;

pub use error::{ExpenseError, StoreError};
pub use repository::{EmployeeDirectory, ExpenseStore, ExpenseTransaction};
pub use service::ExpenseService;
pub use types::{
    EmployeeRecord, EmployeeSnapshot, ExportDate, Expense, ExpenseChange, ExpenseFilter, Flags,
    MINIMUM_CLAIM_AMOUNT, ManagerType, NewExpense, Status, cost_type_id,
};

#[cfg(test)]
mod service_tests;
