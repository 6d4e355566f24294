//! The expense state machine.
//!
//! Pure and synchronous: every collaborator lookup (cost type, attachments,
//! employee) is resolved by the caller and handed in through
//! [`TransitionContext`]. Either the whole change applies or an error is
//! returned and the current snapshot is left as it was.

use chrono::{DateTime, Duration, TimeZone, Utc};
use claimflow_shared::ExpenseId;
use rust_decimal::Decimal;

use crate::cost_type::CostType;
use crate::expense::{
    EmployeeSnapshot, ExportDate, Expense, ExpenseChange, Flags, MINIMUM_CLAIM_AMOUNT,
    ManagerType, NewExpense, Status,
};
use crate::rules::BusinessRuleEngine;
use crate::workflow::error::WorkflowError;
use crate::workflow::rejection;
use crate::workflow::types::{Actor, Field, Role, StatusText};

/// Transaction dates may be this far ahead of now (time zone slack).
const TRANSACTION_DATE_SLACK_HOURS: i64 = 2;

/// Id carried by a claim until the store assigns one.
pub const UNASSIGNED_ID: ExpenseId = ExpenseId(0);

/// Collaborator facts needed to evaluate one transition.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    /// Evaluation time.
    pub now: DateTime<Utc>,
    /// The cost type the claim will reference after the change, if it
    /// resolves.
    pub cost_type: Option<&'a CostType>,
    /// At least one attachment is stored for the claim.
    pub has_attachments: bool,
}

/// Role-gated transition logic for expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseStateMachine {
    rules: BusinessRuleEngine,
}

impl ExpenseStateMachine {
    /// Creates a state machine evaluating `rules`.
    #[must_use]
    pub fn new(rules: BusinessRuleEngine) -> Self {
        Self { rules }
    }

    /// The business rule engine.
    #[must_use]
    pub fn rules(&self) -> &BusinessRuleEngine {
        &self.rules
    }

    /// Builds a new draft claim.
    ///
    /// The returned claim carries [`UNASSIGNED_ID`]; the store assigns the
    /// real id.
    ///
    /// # Errors
    ///
    /// Validation failures for amount, transaction date, cost type, missing
    /// employee data, and the business rules.
    pub fn create(
        &self,
        new: NewExpense,
        employee: EmployeeSnapshot,
        cost_type: Option<&CostType>,
        now: DateTime<Utc>,
    ) -> Result<Expense, WorkflowError> {
        validate_amount(new.amount)?;
        validate_transaction_date(new.transaction_date, now)?;
        self.rules
            .validate(new.amount, &employee.afas_data, now)?;

        if employee.afas_data.iban.trim().is_empty() {
            return Err(WorkflowError::IncompleteEmployeeRecord("IBAN"));
        }
        if employee
            .afas_data
            .manager_number
            .as_deref()
            .is_none_or(|number| number.trim().is_empty())
        {
            return Err(WorkflowError::IncompleteEmployeeRecord("Manager number"));
        }

        let cost_type = active_cost_type(cost_type, &new.cost_type)?;

        Ok(Expense {
            id: UNASSIGNED_ID,
            amount: new.amount,
            note: new.note,
            cost_type: cost_type.id.clone(),
            transaction_date: new.transaction_date,
            claim_date: now,
            manager_type: cost_type.manager_type,
            employee,
            status: Status::draft(),
            flags: None,
        })
    }

    /// Returns true if `actor` may act on `expense` in its role at all.
    ///
    /// Employees act on their own claims only; managers on claims of their
    /// reports, and lease coordinators on lease-coordinated claims.
    #[must_use]
    pub fn may_act(actor: &Actor, expense: &Expense) -> bool {
        match actor.role {
            Role::Employee => expense.is_owned_by(&actor.email),
            Role::Manager => {
                let line_manager = actor.employee_number.is_some()
                    && actor.employee_number == expense.employee.afas_data.manager_number;
                let lease = actor.lease_coordinator
                    && expense.manager_type == ManagerType::Leasecoordinator;
                line_manager || lease
            }
            Role::Creditor | Role::Controller | Role::System => true,
        }
    }

    /// Status a submission is routed to.
    ///
    /// Claims below the cost type's minimum skip the manager step, unless
    /// the minimum is zero or the cost type is lease-coordinated.
    #[must_use]
    pub fn route_submission(cost_type: &CostType, amount: Decimal) -> StatusText {
        if cost_type.min_amount.is_zero()
            || amount >= cost_type.min_amount
            || cost_type.manager_type == ManagerType::Leasecoordinator
        {
            StatusText::ReadyForManager
        } else {
            StatusText::ReadyForCreditor
        }
    }

    /// Applies `change` by `actor` to `current` and returns the new snapshot.
    ///
    /// Fields outside the role's write-set are ignored. A status outside
    /// the allowed targets aborts the whole change.
    ///
    /// # Errors
    ///
    /// `NotPermitted`/`UnauthorizedTransition` for role, ownership, or
    /// state mismatches; validation errors otherwise.
    pub fn apply(
        &self,
        actor: &Actor,
        current: &Expense,
        change: &ExpenseChange,
        ctx: &TransitionContext<'_>,
    ) -> Result<Expense, WorkflowError> {
        let role = actor.role;
        let from = current.status.text;
        let targets = role.allowed_targets(from);

        if targets.is_empty() || !Self::may_act(actor, current) {
            return Err(WorkflowError::NotPermitted { role, status: from });
        }

        let requested = change.status.filter(|_| role.may_write(Field::Status));
        if let Some(to) = requested
            && !targets.contains(&to)
        {
            return Err(WorkflowError::UnauthorizedTransition { role, from, to });
        }

        let mut next = current.clone();

        // Rejection reason
        let rejecting = requested.is_some_and(|to| to.is_rejected());
        let has_reason = change.rnote_id.is_some() || change.rnote.is_some();
        if rejecting && !has_reason {
            return Err(WorkflowError::RejectionReasonRequired);
        }
        if has_reason && role.may_write(Field::RnoteId) {
            let (rnote_id, rnote) = rejection::resolve(change.rnote_id, change.rnote.as_deref())
                .ok_or(WorkflowError::InvalidRejectionReason)?;
            next.status.rnote_id = Some(rnote_id);
            next.status.rnote = Some(rnote);
        }

        // Cost type
        if role.may_write(Field::CostType)
            && let Some(reference) = &change.cost_type
            && crate::expense::cost_type_id(reference) != current.cost_type_id()
        {
            let cost_type = active_cost_type(ctx.cost_type, reference)?;
            next.cost_type = cost_type.id.clone();
            next.manager_type = cost_type.manager_type;
        }

        // Plain fields
        if role.may_write(Field::Amount)
            && let Some(amount) = change.amount
        {
            validate_amount(amount)?;
            next.amount = amount;
        }
        if role.may_write(Field::TransactionDate)
            && let Some(date) = change.transaction_date
        {
            validate_transaction_date(date, ctx.now)?;
            next.transaction_date = date;
        }
        if role.may_write(Field::Note)
            && let Some(note) = &change.note
        {
            next.note.clone_from(note);
        }
        if role.may_write(Field::ManagerType)
            && let Some(manager_type) = change.manager_type
        {
            next.manager_type = manager_type;
        }
        if role.may_write(Field::Flags)
            && let Some(flags) = &change.flags
        {
            next.flags = normalize_flags(flags);
        }

        if role != Role::System {
            self.rules
                .validate(next.amount, &next.employee.afas_data, ctx.now)?;
        }

        // Status
        if let Some(to) = requested {
            let submitting = role == Role::Employee && from.is_employee_editable() && to.is_ready();
            next.status.text = if submitting {
                let cost_type = ctx
                    .cost_type
                    .ok_or_else(|| WorkflowError::InvalidCostType(next.cost_type.clone()))?;
                Self::route_submission(cost_type, next.amount)
            } else {
                to
            };

            if submitting && !ctx.has_attachments {
                return Err(WorkflowError::AttachmentRequired);
            }
        }

        Ok(next)
    }

    /// Moves an approved claim to `exported`, stamping the run time.
    ///
    /// # Errors
    ///
    /// `UnauthorizedTransition` when the claim is no longer approved.
    pub fn mark_exported(
        current: &Expense,
        run_time: DateTime<Utc>,
    ) -> Result<Expense, WorkflowError> {
        let from = current.status.text;
        if !Role::System.allowed_targets(from).contains(&StatusText::Exported) {
            return Err(WorkflowError::UnauthorizedTransition {
                role: Role::System,
                from,
                to: StatusText::Exported,
            });
        }

        let mut next = current.clone();
        next.status.text = StatusText::Exported;
        next.status.export_date = ExportDate::At(run_time);
        Ok(next)
    }
}

fn active_cost_type<'a>(
    cost_type: Option<&'a CostType>,
    reference: &str,
) -> Result<&'a CostType, WorkflowError> {
    cost_type
        .filter(|cost_type| cost_type.active)
        .ok_or_else(|| WorkflowError::InvalidCostType(reference.to_string()))
}

fn validate_amount(amount: Decimal) -> Result<(), WorkflowError> {
    if amount < MINIMUM_CLAIM_AMOUNT || amount.normalize().scale() > 2 {
        return Err(WorkflowError::InvalidAmount(amount));
    }
    Ok(())
}

fn validate_transaction_date(
    date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    let earliest = Utc.timestamp_opt(0, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC);
    let latest = now + Duration::hours(TRANSACTION_DATE_SLACK_HOURS);
    if date <= earliest || date >= latest {
        return Err(WorkflowError::InvalidTransactionDate);
    }
    Ok(())
}

fn normalize_flags(flags: &Flags) -> Option<Flags> {
    if flags.duplicates.is_empty() {
        return None;
    }
    let mut duplicates = flags.duplicates.clone();
    duplicates.sort_unstable();
    duplicates.dedup();
    Some(Flags { duplicates })
}
