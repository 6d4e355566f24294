//! Fixtures shared by the unit tests of this crate.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use claimflow_shared::{Caller, ExpenseId, scopes};
use rust_decimal_macros::dec;

use crate::cost_type::{CatalogError, CostType, CostTypeRepository};
use crate::expense::{
    EmployeeDirectory, EmployeeRecord, EmployeeSnapshot, Expense, ExpenseFilter, ExpenseStore,
    ExpenseTransaction, ManagerType, Status, StoreError,
};
use crate::journal::{AuditEntry, JournalError, JournalRepository};
use crate::notify::{NotificationError, NotificationKind, Notifier, Recipient};
use crate::storage::{Blob, BlobStore, StorageError};
use crate::workflow::StatusText;

pub(crate) const EMPLOYEE_EMAIL: &str = "jan.jansen@example.com";
pub(crate) const MANAGER_EMAIL: &str = "marie.manager@example.com";
pub(crate) const EMPLOYEE_NUMBER: &str = "2001";
pub(crate) const MANAGER_NUMBER: &str = "1001";

pub(crate) fn transaction_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

pub(crate) fn employee_record() -> EmployeeRecord {
    EmployeeRecord {
        employee_number: EMPLOYEE_NUMBER.to_string(),
        manager_number: Some(MANAGER_NUMBER.to_string()),
        company: "VWT BV".to_string(),
        department_code: Some("D42".to_string()),
        department_description: Some("Engineering".to_string()),
        iban: "NL91 ABNA 0417 1643 00".to_string(),
        display_name: "Jan Jansen".to_string(),
        date_in_service: None,
        date_out_service: None,
    }
}

pub(crate) fn employee_snapshot() -> EmployeeSnapshot {
    EmployeeSnapshot {
        email: EMPLOYEE_EMAIL.to_string(),
        given_name: Some("Jan".to_string()),
        family_name: Some("Jansen".to_string()),
        full_name: "Jan Jansen".to_string(),
        afas_data: employee_record(),
    }
}

pub(crate) fn expense(id: i64, status: StatusText) -> Expense {
    Expense {
        id: ExpenseId(id),
        amount: dec!(42.50),
        note: "Taxi to client".to_string(),
        cost_type: "430110".to_string(),
        transaction_date: transaction_date(),
        claim_date: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
        manager_type: ManagerType::Linemanager,
        employee: employee_snapshot(),
        status: Status {
            text: status,
            ..Status::draft()
        },
        flags: None,
    }
}

pub(crate) fn employee_caller() -> Caller {
    Caller::new(EMPLOYEE_EMAIL, "Jan Jansen")
}

pub(crate) fn manager_caller() -> Caller {
    Caller::new(MANAGER_EMAIL, "Marie Manager").with_scope(scopes::MANAGER)
}

pub(crate) fn creditor_caller() -> Caller {
    Caller::new("crediteuren@example.com", "Crediteuren").with_scope(scopes::CREDITOR)
}

// ============================================================================
// In-memory collaborators
// ============================================================================

/// Expense store over a mutex-guarded map. Transactions are not exclusive.
#[derive(Default)]
pub(crate) struct MemoryExpenses {
    expenses: Arc<Mutex<BTreeMap<ExpenseId, Expense>>>,
    next_id: AtomicI64,
    pub(crate) fail_commits: Arc<AtomicBool>,
}

impl MemoryExpenses {
    pub(crate) fn insert(&self, expense: Expense) {
        self.expenses.lock().unwrap().insert(expense.id, expense);
    }

    pub(crate) fn snapshot(&self, id: i64) -> Expense {
        self.expenses.lock().unwrap()[&ExpenseId(id)].clone()
    }
}

struct MemoryTransaction {
    current: Expense,
    expenses: Arc<Mutex<BTreeMap<ExpenseId, Expense>>>,
    fail: Arc<AtomicBool>,
}

#[async_trait]
impl ExpenseTransaction for MemoryTransaction {
    fn current(&self) -> &Expense {
        &self.current
    }

    async fn commit(self: Box<Self>, expense: Expense) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("commit rejected".to_string()));
        }
        self.expenses.lock().unwrap().insert(expense.id, expense);
        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for MemoryExpenses {
    async fn create(&self, mut expense: Expense) -> Result<Expense, StoreError> {
        expense.id = ExpenseId(self.next_id.fetch_add(1, Ordering::SeqCst) + 100);
        self.insert(expense.clone());
        Ok(expense)
    }

    async fn get(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        Ok(self.expenses.lock().unwrap().get(&id).cloned())
    }

    async fn begin(&self, id: ExpenseId) -> Result<Box<dyn ExpenseTransaction>, StoreError> {
        let current = self
            .expenses
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;
        Ok(Box::new(MemoryTransaction {
            current,
            expenses: Arc::clone(&self.expenses),
            fail: Arc::clone(&self.fail_commits),
        }))
    }

    async fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, StoreError> {
        Ok(self
            .expenses
            .lock()
            .unwrap()
            .values()
            .filter(|expense| filter.matches(expense))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct MemoryJournal {
    pub(crate) entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryJournal {
    pub(crate) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl JournalRepository for MemoryJournal {
    async fn append(&self, entry: AuditEntry) -> Result<(), JournalError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    async fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditEntry>, JournalError> {
        Ok(self
            .entries()
            .into_iter()
            .filter(|entry| entry.time >= from && entry.time <= to)
            .collect())
    }
}

pub(crate) struct StaticCostTypes(pub(crate) Vec<CostType>);

#[async_trait]
impl CostTypeRepository for StaticCostTypes {
    async fn find(&self, id: &str) -> Result<Option<CostType>, CatalogError> {
        Ok(self.0.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<CostType>, CatalogError> {
        Ok(self.0.clone())
    }
}

pub(crate) struct StaticDirectory(pub(crate) Vec<(String, EmployeeRecord)>);

#[async_trait]
impl EmployeeDirectory for StaticDirectory {
    async fn get_employee(&self, email: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        Ok(self
            .0
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(email))
            .map(|(_, record)| record.clone()))
    }
}

/// Employee and manager as known to HR.
pub(crate) fn directory() -> StaticDirectory {
    let manager = EmployeeRecord {
        employee_number: MANAGER_NUMBER.to_string(),
        manager_number: Some("1".to_string()),
        display_name: "Marie Manager".to_string(),
        ..employee_record()
    };
    StaticDirectory(vec![
        (EMPLOYEE_EMAIL.to_string(), employee_record()),
        (MANAGER_EMAIL.to_string(), manager),
    ])
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) sent: Mutex<Vec<(NotificationKind, Recipient, ExpenseId)>>,
    pub(crate) fail: AtomicBool,
}

impl RecordingNotifier {
    pub(crate) fn sent(&self) -> Vec<(NotificationKind, Recipient, ExpenseId)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        kind: NotificationKind,
        recipient: &Recipient,
        expense_id: ExpenseId,
    ) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError("smtp down".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((kind, recipient.clone(), expense_id));
        Ok(())
    }
}

/// Blob store that fails every write below `fail_prefix`.
pub(crate) struct FailingBlobs {
    pub(crate) inner: Arc<dyn BlobStore>,
    pub(crate) fail_prefix: &'static str,
}

#[async_trait]
impl BlobStore for FailingBlobs {
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        if path.starts_with(self.fail_prefix) {
            return Err(StorageError::operation("upload rejected"));
        }
        self.inner.put(path, bytes, content_type).await
    }

    async fn get(&self, path: &str) -> Result<Blob, StorageError> {
        self.inner.get(path).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.inner.list(prefix).await
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.inner.delete(path).await
    }
}
