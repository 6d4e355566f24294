//! Expense workflow management for Claimflow.
//!
//! This module implements the expense lifecycle state machine with its
//! per-role transition tables and write-sets, and the rejection reason
//! catalog.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (StatusText, Role, Actor) and tables
//! - `error` - Workflow-specific error types
//! - `machine` - Transition logic
//! - `rejection` - Canned rejection reasons

pub mod error;
pub mod machine;
pub mod rejection;
pub mod types;

#[cfg(test)]
mod machine_props;

pub use error::WorkflowError;
pub use machine::{ExpenseStateMachine, TransitionContext, UNASSIGNED_ID};
pub use rejection::{NoteForm, REJECTION_NOTES, RejectionNote};
pub use types::{Actor, Field, Role, StatusText};
