//! Stateless business rule evaluation.

use chrono::{DateTime, Utc};
use claimflow_shared::ExpenseId;
use claimflow_shared::config::BusinessRulesConfig;
use rust_decimal::Decimal;

use super::error::RuleViolation;
use crate::expense::{EmployeeRecord, Expense, Flags};
use crate::workflow::StatusText;

/// Evaluates the configured business rules.
#[derive(Debug, Clone)]
pub struct BusinessRuleEngine {
    config: BusinessRulesConfig,
}

impl Default for BusinessRuleEngine {
    fn default() -> Self {
        Self::new(BusinessRulesConfig::default())
    }
}

impl BusinessRuleEngine {
    /// Creates an engine with the given toggles.
    #[must_use]
    pub fn new(config: BusinessRulesConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BusinessRulesConfig {
        &self.config
    }

    /// Runs the rejecting rules against the resulting amount.
    ///
    /// # Errors
    ///
    /// The first violated rule, in order: minimum amount, active employment.
    pub fn validate(
        &self,
        amount: Decimal,
        employee: &EmployeeRecord,
        now: DateTime<Utc>,
    ) -> Result<(), RuleViolation> {
        self.check_minimum_amount(amount, employee)?;
        self.check_active_employment(employee, now)?;
        Ok(())
    }

    fn check_minimum_amount(
        &self,
        amount: Decimal,
        employee: &EmployeeRecord,
    ) -> Result<(), RuleViolation> {
        let rule = &self.config.minimum_amount;
        if rule.enabled && employee.company == rule.company && amount <= rule.floor {
            return Err(RuleViolation::MinimumAmount { floor: rule.floor });
        }
        Ok(())
    }

    fn check_active_employment(
        &self,
        employee: &EmployeeRecord,
        now: DateTime<Utc>,
    ) -> Result<(), RuleViolation> {
        if !self.config.active_employment {
            return Ok(());
        }
        match employee.date_out_service {
            Some(date_out_service) if date_out_service < now.date_naive() => {
                Err(RuleViolation::OutOfService { date_out_service })
            }
            _ => Ok(()),
        }
    }

    /// Returns true if the change from `before` to `after` must be checked
    /// for duplicates.
    ///
    /// That is the case when the claim is submitted, or when amount or
    /// transaction date of a submitted claim change.
    #[must_use]
    pub fn duplicate_check_required(&self, before: &Expense, after: &Expense) -> bool {
        if !self.config.duplicate_detection || !counts_for_duplicates(after.status.text) {
            return false;
        }

        let submitted = after.status.text.is_ready() && before.status.text != after.status.text;
        let changed = before.amount != after.amount
            || before.transaction_date != after.transaction_date;

        submitted || changed
    }

    /// Finds the claims `candidate` duplicates among `others`.
    ///
    /// Matches are claims of the same employee with identical transaction
    /// date and amount that are neither draft nor cancelled. Returns `None`
    /// when there is no match, so stale flags are cleared.
    #[must_use]
    pub fn duplicates(&self, candidate: &Expense, others: &[Expense]) -> Option<Flags> {
        let mut duplicates: Vec<ExpenseId> = others
            .iter()
            .filter(|other| {
                other.id != candidate.id
                    && other.is_owned_by(&candidate.employee.email)
                    && counts_for_duplicates(other.status.text)
                    && other.transaction_date == candidate.transaction_date
                    && other.amount == candidate.amount
            })
            .map(|other| other.id)
            .collect();

        if duplicates.is_empty() {
            return None;
        }
        duplicates.sort_unstable();
        duplicates.dedup();
        Some(Flags { duplicates })
    }
}

fn counts_for_duplicates(status: StatusText) -> bool {
    !matches!(status, StatusText::Draft | StatusText::Cancelled)
}
