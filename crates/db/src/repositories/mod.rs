//! Repository implementations of the core persistence traits.
//!
//! Every repository is an in-process map; state is lost on restart.

pub mod cost_type;
pub mod employee;
pub mod expense;
pub mod journal;

pub use cost_type::CostTypeRepository;
pub use employee::EmployeeRepository;
pub use expense::ExpenseRepository;
pub use journal::JournalStore;
