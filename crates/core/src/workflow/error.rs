//! Workflow error types for the expense lifecycle.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::rules::RuleViolation;
use crate::workflow::types::{Role, StatusText};

/// Errors that can occur while creating or transitioning an expense.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The role has no row for the claim's current state, or the caller is
    /// not the owner / manager of the claim.
    #[error("A {role} may not change a claim in status {status}")]
    NotPermitted {
        /// Acting role.
        role: Role,
        /// Current status of the claim.
        status: StatusText,
    },

    /// The requested status is not an allowed target.
    #[error("A {role} may not move a claim from {from} to {to}")]
    UnauthorizedTransition {
        /// Acting role.
        role: Role,
        /// Current status.
        from: StatusText,
        /// Requested status.
        to: StatusText,
    },

    /// A rejection without `rnote_id` or `rnote`.
    #[error("A rejection requires a reason")]
    RejectionReasonRequired,

    /// Unknown reason id, or the free-text reason without text.
    #[error("Invalid rejection reason")]
    InvalidRejectionReason,

    /// Submitting a claim that has no attachment.
    #[error("A claim needs at least one attachment before it can be submitted")]
    AttachmentRequired,

    /// Unknown or inactive cost type.
    #[error("Invalid cost type: {0}")]
    InvalidCostType(String),

    /// Amount below the smallest claimable amount or finer than cents.
    #[error("Invalid amount {0}: must be at least 0.01 with at most two decimals")]
    InvalidAmount(Decimal),

    /// Transaction date outside 1970-01-01 and today.
    #[error("Transaction date needs to be between 1970-01-01 and today")]
    InvalidTransactionDate,

    /// The employee directory lacks data needed to pay the claim.
    #[error("{0} is not known in the personnel records")]
    IncompleteEmployeeRecord(&'static str),

    /// A business rule rejected the claim.
    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotPermitted { .. } | Self::UnauthorizedTransition { .. } => 403,
            Self::RejectionReasonRequired
            | Self::InvalidRejectionReason
            | Self::AttachmentRequired
            | Self::InvalidCostType(_)
            | Self::InvalidAmount(_)
            | Self::InvalidTransactionDate
            | Self::IncompleteEmployeeRecord(_) => 400,
            Self::Rule(rule) => rule.status_code(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotPermitted { .. } | Self::UnauthorizedTransition { .. } => {
                "UNAUTHORIZED_TRANSITION"
            }
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::InvalidRejectionReason => "INVALID_REJECTION_REASON",
            Self::AttachmentRequired => "ATTACHMENT_REQUIRED",
            Self::InvalidCostType(_) => "INVALID_COST_TYPE",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidTransactionDate => "INVALID_TRANSACTION_DATE",
            Self::IncompleteEmployeeRecord(_) => "INCOMPLETE_EMPLOYEE_RECORD",
            Self::Rule(rule) => rule.error_code(),
        }
    }

    /// Returns true for role/state mismatches.
    #[must_use]
    pub fn is_unauthorized_transition(&self) -> bool {
        matches!(
            self,
            Self::NotPermitted { .. } | Self::UnauthorizedTransition { .. }
        )
    }
}
