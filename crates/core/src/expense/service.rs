//! Expense service: one create or update, end to end.
//!
//! Per update the service opens a transaction on the claim, resolves the
//! cost type and attachment facts, asks the state machine for the next
//! snapshot, flags duplicates, journals the change and commits. Approvers
//! are notified after the commit.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use claimflow_shared::{Caller, ExpenseId};

use super::error::ExpenseError;
use super::repository::{EmployeeDirectory, ExpenseStore};
use super::types::{EmployeeSnapshot, Expense, ExpenseChange, ExpenseFilter, ManagerType, NewExpense};
use crate::attachment::{Attachment, AttachmentStore};
use crate::cost_type::CostTypeCatalog;
use crate::journal::{AuditEntry, JournalRepository, diff, journal_rows, render_csv};
use crate::notify::{NotificationKind, Notifier, Recipient};
use crate::workflow::{
    Actor, ExpenseStateMachine, Field, Role, StatusText, TransitionContext, WorkflowError,
};

/// Orchestrates claim creation, updates, attachments and the journal.
#[derive(Clone)]
pub struct ExpenseService {
    machine: ExpenseStateMachine,
    store: Arc<dyn ExpenseStore>,
    catalog: CostTypeCatalog,
    directory: Arc<dyn EmployeeDirectory>,
    attachments: Arc<dyn AttachmentStore>,
    journal: Arc<dyn JournalRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ExpenseService {
    /// Create a new expense service.
    #[must_use]
    pub fn new(
        machine: ExpenseStateMachine,
        store: Arc<dyn ExpenseStore>,
        catalog: CostTypeCatalog,
        directory: Arc<dyn EmployeeDirectory>,
        attachments: Arc<dyn AttachmentStore>,
        journal: Arc<dyn JournalRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            machine,
            store,
            catalog,
            directory,
            attachments,
            journal,
            notifier,
        }
    }

    /// The state machine used for transitions.
    #[must_use]
    pub fn machine(&self) -> &ExpenseStateMachine {
        &self.machine
    }

    /// The cost type catalog.
    #[must_use]
    pub fn catalog(&self) -> &CostTypeCatalog {
        &self.catalog
    }

    // ========================================================================
    // Claims
    // ========================================================================

    /// Creates a draft claim for `caller`.
    ///
    /// # Errors
    ///
    /// `UnknownEmployee` when the caller has no HR record; validation
    /// failures from the state machine.
    pub async fn create(&self, caller: &Caller, new: NewExpense) -> Result<Expense, ExpenseError> {
        let record = self
            .directory
            .get_employee(&caller.email)
            .await?
            .ok_or_else(|| ExpenseError::UnknownEmployee(caller.email.clone()))?;

        let snapshot = EmployeeSnapshot {
            email: caller.email.clone(),
            given_name: caller.given_name.clone(),
            family_name: caller.family_name.clone(),
            full_name: caller.display_name.clone(),
            afas_data: record,
        };

        let now = Utc::now();
        let cost_type = self.catalog.find(&new.cost_type).await?;
        let draft = self
            .machine
            .create(new, snapshot, cost_type.as_deref(), now)?;

        let created = self.store.create(draft).await?;
        let entry = diff(None, &created, &caller.email, now)?;
        self.journal.append(entry).await?;

        tracing::info!(
            expense_id = %created.id,
            employee = %caller.email,
            amount = %created.amount,
            cost_type = %created.cost_type,
            "Expense created"
        );
        Ok(created)
    }

    /// Reads one claim as seen through `role`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the claim does not exist or is not visible to the
    /// caller in this role.
    pub async fn get(
        &self,
        caller: &Caller,
        role: Role,
        id: ExpenseId,
    ) -> Result<Expense, ExpenseError> {
        let actor = self.actor(caller, role).await?;
        let expense = self
            .store
            .get(id)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;

        if !may_view(&actor, &expense) {
            return Err(ExpenseError::NotFound(id));
        }
        Ok(expense)
    }

    /// Lists the claims `role` works on.
    ///
    /// Without explicit statuses in `filter`, employees see all their own
    /// claims, managers and creditors their queue, controllers everything.
    ///
    /// # Errors
    ///
    /// `RoleNotGranted` or store failures.
    pub async fn list(
        &self,
        caller: &Caller,
        role: Role,
        mut filter: ExpenseFilter,
    ) -> Result<Vec<Expense>, ExpenseError> {
        let actor = self.actor(caller, role).await?;
        match role {
            Role::Employee => filter.employee_email = Some(caller.email.clone()),
            Role::Manager if filter.statuses.is_empty() => {
                filter.statuses = vec![StatusText::ReadyForManager];
            }
            Role::Creditor if filter.statuses.is_empty() => {
                filter.statuses = vec![StatusText::ReadyForCreditor];
            }
            _ => {}
        }

        let mut expenses = self.store.list(&filter).await?;
        expenses.retain(|expense| may_view(&actor, expense));
        Ok(expenses)
    }

    /// Applies `change` to claim `id` on behalf of `caller` in `role`.
    ///
    /// Either the whole change is committed and journaled, or nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// `NotFound`, transition and validation failures from the state
    /// machine, and collaborator failures.
    pub async fn update(
        &self,
        caller: &Caller,
        role: Role,
        id: ExpenseId,
        change: ExpenseChange,
    ) -> Result<Expense, ExpenseError> {
        let actor = self.actor(caller, role).await?;
        let now = Utc::now();

        let tx = self.store.begin(id).await?;
        let current = tx.current().clone();

        let reference = change
            .cost_type
            .as_deref()
            .filter(|_| role.may_write(Field::CostType))
            .unwrap_or(&current.cost_type);
        let cost_type = self.catalog.find(reference).await?;

        let submitting = role == Role::Employee
            && current.status.text.is_employee_editable()
            && change.status.is_some_and(|to| to.is_ready());
        let has_attachments = submitting && self.attachments.exists_for(id).await?;

        let ctx = TransitionContext {
            now,
            cost_type: cost_type.as_deref(),
            has_attachments,
        };
        let mut next = match self.machine.apply(&actor, &current, &change, &ctx) {
            Ok(next) => next,
            Err(err) => {
                log_rejected_change(&actor, &current, &err);
                return Err(err.into());
            }
        };

        if self.machine.rules().duplicate_check_required(&current, &next) {
            let others = self
                .store
                .list(&ExpenseFilter {
                    employee_email: Some(next.employee.email.clone()),
                    transaction_date: Some(next.transaction_date),
                    amount: Some(next.amount),
                    ..ExpenseFilter::default()
                })
                .await?;
            next.flags = self.machine.rules().duplicates(&next, &others);
            if let Some(flags) = &next.flags {
                tracing::info!(expense_id = %id, duplicates = ?flags.duplicates, "Possible duplicate claim");
            }
        }

        let entry = diff(Some(&current), &next, &caller.email, Utc::now())?;
        tx.commit(next.clone()).await?;
        if !entry.attributes_changed.is_empty() {
            self.journal.append(entry).await?;
        }

        tracing::info!(
            expense_id = %id,
            role = %role,
            user = %caller.email,
            from = %current.status.text,
            to = %next.status.text,
            "Expense updated"
        );

        self.notify_transition(&current, &next).await;
        Ok(next)
    }

    async fn notify_transition(&self, before: &Expense, after: &Expense) {
        let from = before.status.text;
        let to = after.status.text;
        if from == to {
            return;
        }

        let message = if to == StatusText::ReadyForManager && from.is_employee_editable() {
            let recipient = match after.manager_type {
                ManagerType::Leasecoordinator => Some(Recipient::LeaseCoordinators),
                ManagerType::Linemanager => after
                    .employee
                    .afas_data
                    .manager_number
                    .clone()
                    .map(Recipient::Manager),
            };
            recipient.map(|recipient| (NotificationKind::Submitted, recipient))
        } else if to.is_rejected() {
            Some((
                NotificationKind::Rejected,
                Recipient::Email(after.employee.email.clone()),
            ))
        } else {
            None
        };

        let Some((kind, recipient)) = message else {
            return;
        };
        if let Err(err) = self.notifier.notify(kind, &recipient, after.id).await {
            tracing::warn!(expense_id = %after.id, %kind, %recipient, error = %err, "Notification failed");
        }
    }

    // ========================================================================
    // Attachments
    // ========================================================================

    /// Names of the attachments of a claim visible to the caller.
    ///
    /// # Errors
    ///
    /// `NotFound` when the claim is not visible.
    pub async fn list_attachments(
        &self,
        caller: &Caller,
        role: Role,
        id: ExpenseId,
    ) -> Result<Vec<String>, ExpenseError> {
        self.get(caller, role, id).await?;
        Ok(self.attachments.list(id).await?)
    }

    /// Reads one attachment of a claim visible to the caller.
    ///
    /// # Errors
    ///
    /// `NotFound` when the claim or attachment does not exist.
    pub async fn get_attachment(
        &self,
        caller: &Caller,
        role: Role,
        id: ExpenseId,
        name: &str,
    ) -> Result<Attachment, ExpenseError> {
        self.get(caller, role, id).await?;
        Ok(self.attachments.get(id, name).await?)
    }

    /// Stores an attachment on the caller's own editable claim.
    ///
    /// # Errors
    ///
    /// `AttachmentsLocked` once the claim left the employee's hands;
    /// upload validation failures.
    pub async fn add_attachment(
        &self,
        caller: &Caller,
        id: ExpenseId,
        name: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, ExpenseError> {
        self.editable_by_owner(caller, id).await?;
        Ok(self.attachments.put(id, name, bytes, content_type).await?)
    }

    /// Removes an attachment from the caller's own editable claim.
    ///
    /// # Errors
    ///
    /// `AttachmentsLocked` once the claim left the employee's hands;
    /// `NotFound` when there is no such attachment.
    pub async fn delete_attachment(
        &self,
        caller: &Caller,
        id: ExpenseId,
        name: &str,
    ) -> Result<(), ExpenseError> {
        self.editable_by_owner(caller, id).await?;
        Ok(self.attachments.delete(id, name).await?)
    }

    async fn editable_by_owner(&self, caller: &Caller, id: ExpenseId) -> Result<(), ExpenseError> {
        let expense = self.get(caller, Role::Employee, id).await?;
        if !expense.status.text.is_employee_editable() {
            return Err(ExpenseError::AttachmentsLocked(id));
        }
        Ok(())
    }

    // ========================================================================
    // Journal
    // ========================================================================

    /// Journal entries committed between `from` and `to`.
    ///
    /// # Errors
    ///
    /// Repository failures.
    pub async fn journal(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditEntry>, ExpenseError> {
        Ok(self.journal.between(from, to).await?)
    }

    /// Journal entries between `from` and `to` as a CSV report.
    ///
    /// # Errors
    ///
    /// Repository or rendering failures.
    pub async fn journal_csv(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<u8>, ExpenseError> {
        let entries = self.journal(from, to).await?;
        Ok(render_csv(&journal_rows(&entries))?)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn actor(&self, caller: &Caller, role: Role) -> Result<Actor, ExpenseError> {
        if !role.granted_to(caller) {
            return Err(ExpenseError::RoleNotGranted(role));
        }
        let employee_number = if role == Role::Manager {
            self.directory
                .get_employee(&caller.email)
                .await?
                .map(|record| record.employee_number)
        } else {
            None
        };
        Ok(Actor::new(role, caller, employee_number))
    }
}

fn may_view(actor: &Actor, expense: &Expense) -> bool {
    match actor.role {
        Role::Employee | Role::Manager => ExpenseStateMachine::may_act(actor, expense),
        Role::Creditor | Role::Controller | Role::System => true,
    }
}

fn log_rejected_change(actor: &Actor, current: &Expense, err: &WorkflowError) {
    if err.is_unauthorized_transition() {
        tracing::warn!(
            expense_id = %current.id,
            role = %actor.role,
            user = %actor.email,
            status = %current.status.text,
            error = %err,
            "Unauthorized transition"
        );
    } else {
        tracing::debug!(expense_id = %current.id, error = %err, "Expense change rejected");
    }
}
