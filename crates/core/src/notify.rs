//! Fire-and-forget notifications about claim progress.
//!
//! Delivery failures never fail the request that triggered them; callers
//! log and move on.

use std::fmt;

use async_trait::async_trait;
use claimflow_shared::ExpenseId;
use thiserror::Error;

/// What happened to the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A claim is waiting for the recipient's approval.
    Submitted,
    /// The recipient's claim was rejected.
    Rejected,
}

impl NotificationKind {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who gets notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// A person, by email.
    Email(String),
    /// The line manager with this employee number.
    Manager(String),
    /// Everyone holding the lease coordinator scope.
    LeaseCoordinators,
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(email) => write!(f, "email:{email}"),
            Self::Manager(number) => write!(f, "manager:{number}"),
            Self::LeaseCoordinators => f.write_str("leasecoordinators"),
        }
    }
}

/// Notification delivery failure.
#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotificationError(pub String);

/// Delivers claim notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `kind` about `expense_id` to `recipient`.
    async fn notify(
        &self,
        kind: NotificationKind,
        recipient: &Recipient,
        expense_id: ExpenseId,
    ) -> Result<(), NotificationError>;
}

/// Notifier that only writes a log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        kind: NotificationKind,
        recipient: &Recipient,
        expense_id: ExpenseId,
    ) -> Result<(), NotificationError> {
        tracing::info!(%kind, %recipient, %expense_id, "Notification");
        Ok(())
    }
}
