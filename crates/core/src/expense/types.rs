//! Expense aggregate and its embedded value types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use claimflow_shared::ExpenseId;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::workflow::StatusText;

/// Smallest amount that can be claimed.
pub const MINIMUM_CLAIM_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Who approves a claim in the manager step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerType {
    /// The employee's line manager.
    #[default]
    Linemanager,
    /// Any holder of the lease coordinator scope.
    Leasecoordinator,
}

impl ManagerType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linemanager => "linemanager",
            Self::Leasecoordinator => "leasecoordinator",
        }
    }
}

impl fmt::Display for ManagerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When the expense was exported, if ever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportDate {
    /// Not exported yet; serialized as `"never"`.
    #[default]
    Never,
    /// Timestamp of the export run.
    At(DateTime<Utc>),
}

impl Serialize for ExportDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Never => serializer.serialize_str("never"),
            Self::At(time) => serializer.serialize_str(&time.to_rfc3339()),
        }
    }
}

impl<'de> Deserialize<'de> for ExportDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "never" {
            return Ok(Self::Never);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|time| Self::At(time.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

/// Workflow position of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Current state.
    pub text: StatusText,
    /// Export timestamp, written once by the export pipeline.
    #[serde(default)]
    pub export_date: ExportDate,
    /// Rejection reason id from the rejection note catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rnote_id: Option<u32>,
    /// Rejection reason text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rnote: Option<String>,
}

impl Status {
    /// Fresh status of a newly created claim.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            text: StatusText::Draft,
            export_date: ExportDate::Never,
            rnote_id: None,
            rnote: None,
        }
    }
}

/// HR record of an employee as served by the employee directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Personnel number.
    pub employee_number: String,
    /// Personnel number of the line manager.
    #[serde(default)]
    pub manager_number: Option<String>,
    /// Employing company.
    pub company: String,
    /// Department code.
    #[serde(default)]
    pub department_code: Option<String>,
    /// Department description.
    #[serde(default)]
    pub department_description: Option<String>,
    /// Bank account receiving reimbursements.
    pub iban: String,
    /// Name as registered by HR.
    pub display_name: String,
    /// First day of employment.
    #[serde(default)]
    pub date_in_service: Option<NaiveDate>,
    /// Last day of employment.
    #[serde(default)]
    pub date_out_service: Option<NaiveDate>,
}

/// Point-in-time copy of the claimant, taken at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSnapshot {
    /// Email / UPN.
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub given_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub family_name: Option<String>,
    /// Full display name.
    pub full_name: String,
    /// HR data at creation time.
    pub afas_data: EmployeeRecord,
}

/// Advisory markers surfaced to approvers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags {
    /// Claims of the same employee with identical date and amount.
    #[serde(default)]
    pub duplicates: Vec<ExpenseId>,
}

/// An employee-submitted reimbursement claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Store-assigned id.
    pub id: ExpenseId,
    /// Claimed amount in EUR.
    pub amount: Decimal,
    /// Free text note.
    pub note: String,
    /// Cost type reference, optionally `label:id`.
    pub cost_type: String,
    /// Date the cost was made.
    pub transaction_date: DateTime<Utc>,
    /// Date the claim was created.
    pub claim_date: DateTime<Utc>,
    /// Approver kind, derived from the cost type.
    #[serde(default)]
    pub manager_type: ManagerType,
    /// Claimant snapshot.
    pub employee: EmployeeSnapshot,
    /// Workflow status.
    pub status: Status,
    /// Advisory flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Flags>,
}

impl Expense {
    /// Cost type id referenced by this claim.
    #[must_use]
    pub fn cost_type_id(&self) -> &str {
        cost_type_id(&self.cost_type)
    }

    /// Text shared by the booking row and the payment remittance.
    #[must_use]
    pub fn reference(&self) -> String {
        format!(
            "{} {}",
            self.employee.afas_data.employee_number,
            self.transaction_date.format("%d-%m-%Y")
        )
    }

    /// Returns true if `email` owns this claim.
    #[must_use]
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.employee.email.eq_ignore_ascii_case(email)
    }
}

/// Extracts the id part of a `label:id` cost type reference.
#[must_use]
pub fn cost_type_id(reference: &str) -> &str {
    reference
        .rsplit_once(':')
        .map_or(reference, |(_, id)| id)
        .trim()
}

/// Fields of a new claim, as supplied by the employee.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    /// Claimed amount.
    pub amount: Decimal,
    /// Free text note.
    #[serde(default)]
    pub note: String,
    /// Cost type reference.
    pub cost_type: String,
    /// Date the cost was made.
    pub transaction_date: DateTime<Utc>,
}

/// A pending change to an existing claim.
///
/// Built once at the API boundary; fields that are `None` were absent from
/// the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseChange {
    /// Requested status.
    #[serde(default)]
    pub status: Option<StatusText>,
    /// New amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New note.
    #[serde(default)]
    pub note: Option<String>,
    /// New cost type reference.
    #[serde(default)]
    pub cost_type: Option<String>,
    /// New transaction date.
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    /// Rejection reason id.
    #[serde(default)]
    pub rnote_id: Option<u32>,
    /// Rejection reason text.
    #[serde(default)]
    pub rnote: Option<String>,
    /// New approver kind.
    #[serde(default)]
    pub manager_type: Option<ManagerType>,
    /// Replacement flags.
    #[serde(default)]
    pub flags: Option<Flags>,
}

/// Selection criteria for listing claims.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Only claims in one of these states (empty = any).
    pub statuses: Vec<StatusText>,
    /// Only claims of this employee (by email).
    pub employee_email: Option<String>,
    /// Only claims whose employee reports to this manager number.
    pub manager_number: Option<String>,
    /// Only claims with this approver kind.
    pub manager_type: Option<ManagerType>,
    /// Only claims with this transaction date.
    pub transaction_date: Option<DateTime<Utc>>,
    /// Only claims with this amount.
    pub amount: Option<Decimal>,
    /// Only claims created at or after this time.
    pub claim_date_from: Option<DateTime<Utc>>,
    /// Only claims created at or before this time.
    pub claim_date_to: Option<DateTime<Utc>>,
}

impl ExpenseFilter {
    /// Returns true if `expense` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, expense: &Expense) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&expense.status.text) {
            return false;
        }
        if let Some(email) = &self.employee_email
            && !expense.is_owned_by(email)
        {
            return false;
        }
        if let Some(number) = &self.manager_number
            && expense.employee.afas_data.manager_number.as_deref() != Some(number.as_str())
        {
            return false;
        }
        if self.manager_type.is_some_and(|kind| kind != expense.manager_type) {
            return false;
        }
        if self
            .transaction_date
            .is_some_and(|date| date != expense.transaction_date)
        {
            return false;
        }
        if self.amount.is_some_and(|amount| amount != expense.amount) {
            return false;
        }
        if self.claim_date_from.is_some_and(|from| expense.claim_date < from) {
            return false;
        }
        if self.claim_date_to.is_some_and(|to| expense.claim_date > to) {
            return false;
        }
        true
    }
}
