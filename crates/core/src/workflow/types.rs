//! Workflow domain types for the expense lifecycle.
//!
//! The transition tables live here as static data; the state machine in
//! `machine` is the only code that interprets them.

use std::fmt;

use claimflow_shared::{Caller, scopes};
use serde::{Deserialize, Serialize};

/// Expense status in the approval workflow.
///
/// Claims start in `Draft`; `Exported` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusText {
    /// Being drafted by the employee.
    Draft,
    /// Waiting for the line manager or lease coordinator.
    ReadyForManager,
    /// Waiting for the creditor administration.
    ReadyForCreditor,
    /// Sent back by the manager.
    RejectedByManager,
    /// Sent back by the creditor administration.
    RejectedByCreditor,
    /// Approved for payment.
    Approved,
    /// Included in an export run (terminal).
    Exported,
    /// Withdrawn by the employee (terminal).
    Cancelled,
}

impl StatusText {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Draft,
        Self::ReadyForManager,
        Self::ReadyForCreditor,
        Self::RejectedByManager,
        Self::RejectedByCreditor,
        Self::Approved,
        Self::Exported,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::ReadyForManager => "ready_for_manager",
            Self::ReadyForCreditor => "ready_for_creditor",
            Self::RejectedByManager => "rejected_by_manager",
            Self::RejectedByCreditor => "rejected_by_creditor",
            Self::Approved => "approved",
            Self::Exported => "exported",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Returns true for `rejected_by_*`.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::RejectedByManager | Self::RejectedByCreditor)
    }

    /// Returns true for `ready_for_*`.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::ReadyForManager | Self::ReadyForCreditor)
    }

    /// Returns true while the employee may still edit the claim.
    #[must_use]
    pub fn is_employee_editable(&self) -> bool {
        matches!(self, Self::Draft) || self.is_rejected()
    }

    /// Returns true if no further transition exists.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exported | Self::Cancelled)
    }
}

impl fmt::Display for StatusText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expense attribute that a role may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `status.text`.
    Status,
    /// `cost_type`.
    CostType,
    /// `note`.
    Note,
    /// `transaction_date`.
    TransactionDate,
    /// `amount`.
    Amount,
    /// `flags`.
    Flags,
    /// `status.rnote`.
    Rnote,
    /// `status.rnote_id`.
    RnoteId,
    /// `manager_type`.
    ManagerType,
    /// `status.export_date`.
    ExportDate,
}

/// Role an actor plays towards an expense.
///
/// Derived from the caller's scopes and the route it came in on, never
/// stored on the expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The claimant.
    Employee,
    /// Line manager or lease coordinator.
    Manager,
    /// Creditor administration.
    Creditor,
    /// Financial controller, same rights as the creditor administration.
    Controller,
    /// The export pipeline.
    System,
}

const EMPLOYEE_FROM: &[StatusText] = &[
    StatusText::Draft,
    StatusText::RejectedByManager,
    StatusText::RejectedByCreditor,
];
const EMPLOYEE_TO: &[StatusText] = &[
    StatusText::Draft,
    StatusText::ReadyForManager,
    StatusText::ReadyForCreditor,
    StatusText::Cancelled,
];
const EMPLOYEE_FIELDS: &[Field] = &[
    Field::Status,
    Field::CostType,
    Field::Note,
    Field::TransactionDate,
    Field::Amount,
    Field::Flags,
];

const MANAGER_TO: &[StatusText] = &[StatusText::ReadyForCreditor, StatusText::RejectedByManager];
const CREDITOR_TO: &[StatusText] = &[StatusText::RejectedByCreditor, StatusText::Approved];
const APPROVER_FIELDS: &[Field] = &[
    Field::Status,
    Field::CostType,
    Field::Rnote,
    Field::RnoteId,
    Field::ManagerType,
    Field::Flags,
];

const SYSTEM_TO: &[StatusText] = &[StatusText::Exported];
const SYSTEM_FIELDS: &[Field] = &[Field::Status, Field::ExportDate];

impl Role {
    /// Every role.
    pub const ALL: [Self; 5] = [
        Self::Employee,
        Self::Manager,
        Self::Creditor,
        Self::Controller,
        Self::System,
    ];

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Creditor => "creditor",
            Self::Controller => "controller",
            Self::System => "system",
        }
    }

    /// Statuses the role may move a claim to from `from`.
    ///
    /// Empty when the role has no row for `from`.
    #[must_use]
    pub fn allowed_targets(&self, from: StatusText) -> &'static [StatusText] {
        match (self, from) {
            (Self::Employee, from) if EMPLOYEE_FROM.contains(&from) => EMPLOYEE_TO,
            (Self::Manager, StatusText::ReadyForManager) => MANAGER_TO,
            (Self::Creditor | Self::Controller, StatusText::ReadyForCreditor) => CREDITOR_TO,
            (Self::System, StatusText::Approved) => SYSTEM_TO,
            _ => &[],
        }
    }

    /// Attributes the role may write.
    #[must_use]
    pub fn writable_fields(&self) -> &'static [Field] {
        match self {
            Self::Employee => EMPLOYEE_FIELDS,
            Self::Manager | Self::Creditor | Self::Controller => APPROVER_FIELDS,
            Self::System => SYSTEM_FIELDS,
        }
    }

    /// Returns true if the role may write `field`.
    #[must_use]
    pub fn may_write(&self, field: Field) -> bool {
        self.writable_fields().contains(&field)
    }

    /// Returns true if `caller` holds a scope granting this role.
    ///
    /// Every caller is an employee; nobody is the system.
    #[must_use]
    pub fn granted_to(&self, caller: &Caller) -> bool {
        match self {
            Self::Employee => true,
            Self::Manager => {
                caller.has_scope(scopes::MANAGER) || caller.has_scope(scopes::LEASE_COORDINATOR)
            }
            Self::Creditor => caller.has_scope(scopes::CREDITOR),
            Self::Controller => caller.has_scope(scopes::CONTROLLER),
            Self::System => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is acting on an expense, and in which role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Role for this request.
    pub role: Role,
    /// Email / UPN of the caller.
    pub email: String,
    /// Personnel number of the caller, when known to the directory.
    pub employee_number: Option<String>,
    /// Caller holds `leasecoordinator.write`.
    pub lease_coordinator: bool,
}

impl Actor {
    /// Builds the actor for `caller` acting as `role`.
    #[must_use]
    pub fn new(role: Role, caller: &Caller, employee_number: Option<String>) -> Self {
        Self {
            role,
            email: caller.email.clone(),
            employee_number,
            lease_coordinator: caller.has_scope(scopes::LEASE_COORDINATOR),
        }
    }

    /// The export pipeline.
    #[must_use]
    pub fn system() -> Self {
        Self {
            role: Role::System,
            email: "system".to_string(),
            employee_number: None,
            lease_coordinator: false,
        }
    }
}
