//! Core business logic for Claimflow.
//!
//! This crate contains the expense approval workflow and the export
//! pipeline with ZERO web or database dependencies. Persistence, HR data,
//! notifications and blob storage are reached through the traits declared
//! here.
//!
//! # Modules
//!
//! - `workflow` - Expense status state machine and role tables
//! - `rules` - Business rule engine
//! - `expense` - Expense model and the orchestrating service
//! - `cost_type` - Cached cost type catalog
//! - `journal` - Audit journal diffs and reports
//! - `export` - Booking and SEPA payment files
//! - `bank` - BIC lookup for Dutch IBANs
//! - `attachment` - Receipts attached to claims
//! - `storage` - Blob storage over OpenDAL
//! - `notify` - Approver and employee notifications

pub mod attachment;
pub mod bank;
pub mod cost_type;
pub mod expense;
pub mod export;
pub mod journal;
pub mod notify;
pub mod rules;
pub mod storage;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
