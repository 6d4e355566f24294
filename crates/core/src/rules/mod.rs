//! Business rules evaluated before a claim is created or changed.
//!
//! Rules run fail-fast in a fixed order: minimum amount, then active
//! employment. The duplicate rule never rejects; it only produces advisory
//! flags.

mod engine;
mod error;

#[cfg(test)]
mod engine_props;

pub use engine::BusinessRuleEngine;
pub use error::RuleViolation;
