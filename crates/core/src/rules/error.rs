//! Rule violation types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// A business rule rejected the claim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// The amount does not exceed the company's floor.
    #[error("The amount of a claim must be greater than €{floor}")]
    MinimumAmount {
        /// Configured floor.
        floor: Decimal,
    },

    /// The employee is no longer employed.
    #[error("Employment ended on {date_out_service}; claims can no longer be submitted or changed")]
    OutOfService {
        /// Last day of employment.
        date_out_service: NaiveDate,
    },
}

impl RuleViolation {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        400
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MinimumAmount { .. } => "MINIMUM_AMOUNT",
            Self::OutOfService { .. } => "OUT_OF_SERVICE",
        }
    }
}
