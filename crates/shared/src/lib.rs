//! Shared types, errors, and configuration for Claimflow.
//!
//! This crate provides common types used across all other crates:
//! - Typed expense identifiers
//! - Caller identity and JWT handling
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Caller, Claims, scopes};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{ExpenseId, JournalEntryId};
