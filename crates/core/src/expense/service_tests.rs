//! Tests for the expense service against in-memory collaborators.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use bytes::Bytes;
use chrono::{Duration, Utc};
use claimflow_shared::{Caller, ExpenseId, scopes};
use rust_decimal_macros::dec;

use super::*;
use crate::attachment::{AttachmentStore, BlobAttachmentStore};
use crate::cost_type::{CostType, CostTypeCatalog};
use crate::expense::StoreError;
use crate::notify::{NotificationKind, Recipient};
use crate::storage::{StorageConfig, StorageService};
use crate::testing::{
    EMPLOYEE_EMAIL, MANAGER_NUMBER, MemoryExpenses, MemoryJournal, RecordingNotifier,
    StaticCostTypes, creditor_caller, directory, employee_caller, expense, manager_caller,
    transaction_date,
};
use crate::workflow::{ExpenseStateMachine, Role, StatusText, WorkflowError};

struct Harness {
    service: ExpenseService,
    store: Arc<MemoryExpenses>,
    journal: Arc<MemoryJournal>,
    notifier: Arc<RecordingNotifier>,
    attachments: Arc<BlobAttachmentStore>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryExpenses::default());
    let journal = Arc::new(MemoryJournal::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let blobs = Arc::new(StorageService::memory().unwrap());
    let attachments = Arc::new(BlobAttachmentStore::new(blobs, StorageConfig::memory()));
    let catalog = CostTypeCatalog::new(Arc::new(StaticCostTypes(vec![
        CostType::new("430110", "430110"),
        CostType::new("430200", "430250").with_manager_type(ManagerType::Leasecoordinator),
        CostType::new("999999", "999999").inactive(),
    ])));

    let service = ExpenseService::new(
        ExpenseStateMachine::default(),
        store.clone(),
        catalog,
        Arc::new(directory()),
        attachments.clone(),
        journal.clone(),
        notifier.clone(),
    );

    Harness {
        service,
        store,
        journal,
        notifier,
        attachments,
    }
}

impl Harness {
    async fn attach(&self, id: i64) {
        self.attachments
            .put(
                ExpenseId(id),
                "bon.pdf",
                Bytes::from_static(b"%PDF-1.7"),
                "application/pdf",
            )
            .await
            .unwrap();
    }
}

fn new_expense(amount: rust_decimal::Decimal) -> NewExpense {
    NewExpense {
        amount,
        note: "Parkeren".to_string(),
        cost_type: "Reiskosten:430110".to_string(),
        transaction_date: transaction_date(),
    }
}

fn submit() -> ExpenseChange {
    ExpenseChange {
        status: Some(StatusText::ReadyForManager),
        ..ExpenseChange::default()
    }
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_draft_and_journal() {
    let h = harness();

    let created = h
        .service
        .create(&employee_caller(), new_expense(dec!(42.50)))
        .await
        .unwrap();

    assert_eq!(created.id, ExpenseId(100));
    assert_eq!(created.status.text, StatusText::Draft);
    assert_eq!(created.status.export_date, ExportDate::Never);
    assert_eq!(created.cost_type, "430110");
    assert_eq!(created.employee.afas_data.employee_number, "2001");
    assert_eq!(h.store.snapshot(100), created);

    let entries = h.journal.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].expense_id, created.id);
    assert_eq!(entries[0].user, EMPLOYEE_EMAIL);
}

#[tokio::test]
async fn test_create_unknown_employee() {
    let h = harness();
    let stranger = Caller::new("nobody@example.com", "Nobody");

    let err = h
        .service
        .create(&stranger, new_expense(dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, ExpenseError::UnknownEmployee(_)));
    assert_eq!(err.status_code(), 404);
    assert!(h.journal.entries().is_empty());
}

#[tokio::test]
async fn test_create_rejects_inactive_cost_type() {
    let h = harness();
    let mut new = new_expense(dec!(10));
    new.cost_type = "999999".to_string();

    let err = h.service.create(&employee_caller(), new).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_COST_TYPE");
    assert_eq!(err.status_code(), 400);
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_submit_without_attachment_stays_draft() {
    let h = harness();
    h.store.insert(expense(1, StatusText::Draft));

    let err = h
        .service
        .update(&employee_caller(), Role::Employee, ExpenseId(1), submit())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExpenseError::Workflow(WorkflowError::AttachmentRequired)
    ));
    assert_eq!(h.store.snapshot(1).status.text, StatusText::Draft);
    assert!(h.journal.entries().is_empty());
}

#[tokio::test]
async fn test_submit_routes_by_amount() {
    let h = harness();
    let mut small = expense(1, StatusText::Draft);
    small.amount = dec!(49.99);
    let mut large = expense(2, StatusText::Draft);
    large.amount = dec!(50.00);
    large.transaction_date = transaction_date() - Duration::days(1);
    h.store.insert(small);
    h.store.insert(large);
    h.attach(1).await;
    h.attach(2).await;

    let small = h
        .service
        .update(&employee_caller(), Role::Employee, ExpenseId(1), submit())
        .await
        .unwrap();
    let large = h
        .service
        .update(&employee_caller(), Role::Employee, ExpenseId(2), submit())
        .await
        .unwrap();

    assert_eq!(small.status.text, StatusText::ReadyForCreditor);
    assert_eq!(large.status.text, StatusText::ReadyForManager);
    assert_eq!(
        h.notifier.sent(),
        vec![(
            NotificationKind::Submitted,
            Recipient::Manager(MANAGER_NUMBER.to_string()),
            ExpenseId(2)
        )]
    );
}

#[tokio::test]
async fn test_failed_commit_leaves_no_journal_entry() {
    let h = harness();
    let mut claim = expense(1, StatusText::Draft);
    claim.amount = dec!(75.20);
    h.store.insert(claim);
    h.attach(1).await;
    h.store.fail_commits.store(true, Ordering::SeqCst);

    let err = h
        .service
        .update(&employee_caller(), Role::Employee, ExpenseId(1), submit())
        .await
        .unwrap_err();

    assert!(matches!(err, ExpenseError::Store(StoreError::Backend(_))));
    assert_eq!(h.store.snapshot(1).status.text, StatusText::Draft);
    assert!(h.journal.entries().is_empty());
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_submit_lease_cost_type_notifies_coordinators() {
    let h = harness();
    let mut claim = expense(1, StatusText::Draft);
    claim.amount = dec!(12);
    h.store.insert(claim);
    h.attach(1).await;

    let change = ExpenseChange {
        cost_type: Some("430200".to_string()),
        ..submit()
    };
    let updated = h
        .service
        .update(&employee_caller(), Role::Employee, ExpenseId(1), change)
        .await
        .unwrap();

    assert_eq!(updated.manager_type, ManagerType::Leasecoordinator);
    assert_eq!(updated.status.text, StatusText::ReadyForManager);
    assert_eq!(h.notifier.sent()[0].1, Recipient::LeaseCoordinators);
}

#[tokio::test]
async fn test_notification_failure_is_swallowed() {
    let h = harness();
    let mut claim = expense(1, StatusText::Draft);
    claim.amount = dec!(75);
    h.store.insert(claim);
    h.attach(1).await;
    h.notifier.fail.store(true, Ordering::SeqCst);

    let updated = h
        .service
        .update(&employee_caller(), Role::Employee, ExpenseId(1), submit())
        .await
        .unwrap();
    assert_eq!(updated.status.text, StatusText::ReadyForManager);
    assert_eq!(h.store.snapshot(1).status.text, StatusText::ReadyForManager);
}

// ============================================================================
// Approvers
// ============================================================================

#[tokio::test]
async fn test_manager_reject_requires_reason() {
    let h = harness();
    h.store.insert(expense(2, StatusText::ReadyForManager));

    let change = ExpenseChange {
        status: Some(StatusText::RejectedByManager),
        ..ExpenseChange::default()
    };
    let err = h
        .service
        .update(&manager_caller(), Role::Manager, ExpenseId(2), change)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(h.store.snapshot(2).status.text, StatusText::ReadyForManager);
}

#[tokio::test]
async fn test_manager_reject_notifies_employee() {
    let h = harness();
    h.store.insert(expense(2, StatusText::ReadyForManager));

    let change = ExpenseChange {
        status: Some(StatusText::RejectedByManager),
        rnote_id: Some(3),
        ..ExpenseChange::default()
    };
    let updated = h
        .service
        .update(&manager_caller(), Role::Manager, ExpenseId(2), change)
        .await
        .unwrap();

    assert_eq!(updated.status.text, StatusText::RejectedByManager);
    assert_eq!(
        updated.status.rnote.as_deref(),
        Some("Deze kosten zijn al gedeclareerd")
    );
    assert_eq!(
        h.notifier.sent(),
        vec![(
            NotificationKind::Rejected,
            Recipient::Email(EMPLOYEE_EMAIL.to_string()),
            ExpenseId(2)
        )]
    );
    let entry = h.journal.entries().pop().unwrap();
    assert_eq!(entry.user, crate::testing::MANAGER_EMAIL);
}

#[tokio::test]
async fn test_other_manager_cannot_act() {
    let h = harness();
    let mut claim = expense(2, StatusText::ReadyForManager);
    claim.employee.afas_data.manager_number = Some("7777".to_string());
    h.store.insert(claim.clone());

    let change = ExpenseChange {
        status: Some(StatusText::ReadyForCreditor),
        ..ExpenseChange::default()
    };
    let err = h
        .service
        .update(&manager_caller(), Role::Manager, ExpenseId(2), change)
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "UNAUTHORIZED_TRANSITION");
    assert_eq!(h.store.snapshot(2), claim);
}

#[tokio::test]
async fn test_edge_outside_table_leaves_claim_unchanged() {
    let h = harness();
    let claim = expense(3, StatusText::Draft);
    h.store.insert(claim.clone());

    let change = ExpenseChange {
        status: Some(StatusText::Approved),
        ..ExpenseChange::default()
    };
    let err = h
        .service
        .update(&creditor_caller(), Role::Creditor, ExpenseId(3), change)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 403);
    assert_eq!(err.error_code(), "UNAUTHORIZED_TRANSITION");
    assert_eq!(h.store.snapshot(3), claim);
    assert!(h.journal.entries().is_empty());
}

#[tokio::test]
async fn test_role_requires_scope() {
    let h = harness();
    h.store.insert(expense(3, StatusText::ReadyForCreditor));

    let err = h
        .service
        .update(
            &employee_caller(),
            Role::Creditor,
            ExpenseId(3),
            ExpenseChange::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExpenseError::RoleNotGranted(Role::Creditor)));
}

#[tokio::test]
async fn test_update_missing_claim() {
    let h = harness();
    let err = h
        .service
        .update(&employee_caller(), Role::Employee, ExpenseId(404), submit())
        .await
        .unwrap_err();
    assert!(matches!(err, ExpenseError::NotFound(ExpenseId(404))));
}

// ============================================================================
// Duplicates
// ============================================================================

#[tokio::test]
async fn test_submission_flags_duplicates() {
    let h = harness();
    let mut earlier = expense(1, StatusText::Approved);
    earlier.amount = dec!(75);
    let mut drafted = expense(2, StatusText::Draft);
    drafted.amount = dec!(75);
    let mut cancelled = expense(3, StatusText::Cancelled);
    cancelled.amount = dec!(75);
    let mut candidate = expense(4, StatusText::Draft);
    candidate.amount = dec!(75);
    for claim in [earlier, drafted, cancelled, candidate] {
        h.store.insert(claim);
    }
    h.attach(4).await;

    let updated = h
        .service
        .update(&employee_caller(), Role::Employee, ExpenseId(4), submit())
        .await
        .unwrap();

    assert_eq!(
        updated.flags,
        Some(Flags {
            duplicates: vec![ExpenseId(1)]
        })
    );
}

#[tokio::test]
async fn test_unique_submission_has_no_flags() {
    let h = harness();
    let mut claim = expense(4, StatusText::Draft);
    claim.amount = dec!(75);
    h.store.insert(claim);
    h.attach(4).await;

    let updated = h
        .service
        .update(&employee_caller(), Role::Employee, ExpenseId(4), submit())
        .await
        .unwrap();
    assert_eq!(updated.flags, None);
}

// ============================================================================
// Reads, attachments, journal
// ============================================================================

#[tokio::test]
async fn test_visibility_per_role() {
    let h = harness();
    h.store.insert(expense(1, StatusText::ReadyForManager));
    let mut foreign = expense(2, StatusText::ReadyForCreditor);
    foreign.employee.email = "iemand@example.com".to_string();
    h.store.insert(foreign);

    let own = h
        .service
        .list(&employee_caller(), Role::Employee, ExpenseFilter::default())
        .await
        .unwrap();
    assert_eq!(own.len(), 1);

    let managed = h
        .service
        .list(&manager_caller(), Role::Manager, ExpenseFilter::default())
        .await
        .unwrap();
    assert_eq!(managed.iter().map(|e| e.id).collect::<Vec<_>>(), vec![ExpenseId(1)]);

    let queue = h
        .service
        .list(&creditor_caller(), Role::Creditor, ExpenseFilter::default())
        .await
        .unwrap();
    assert_eq!(queue.iter().map(|e| e.id).collect::<Vec<_>>(), vec![ExpenseId(2)]);

    let err = h
        .service
        .get(&employee_caller(), Role::Employee, ExpenseId(2))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_attachments_locked_after_submission() {
    let h = harness();
    h.store.insert(expense(1, StatusText::ReadyForCreditor));

    let err = h
        .service
        .add_attachment(
            &employee_caller(),
            ExpenseId(1),
            "late.pdf",
            Bytes::from_static(b"%PDF"),
            "application/pdf",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExpenseError::AttachmentsLocked(_)));
}

#[tokio::test]
async fn test_attachment_lifecycle_through_service() {
    let h = harness();
    h.store.insert(expense(1, StatusText::Draft));

    let name = h
        .service
        .add_attachment(
            &employee_caller(),
            ExpenseId(1),
            "bon.png",
            Bytes::from_static(b"\x89PNG"),
            "image/png",
        )
        .await
        .unwrap();
    let names = h
        .service
        .list_attachments(&creditor_caller(), Role::Creditor, ExpenseId(1))
        .await
        .unwrap();
    assert_eq!(names, vec![name.clone()]);

    h.service
        .delete_attachment(&employee_caller(), ExpenseId(1), &name)
        .await
        .unwrap();
    assert!(
        h.service
            .list_attachments(&employee_caller(), Role::Employee, ExpenseId(1))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_journal_csv_covers_updates() {
    let h = harness();
    let before = Utc::now() - Duration::minutes(1);
    h.store.insert(expense(2, StatusText::ReadyForManager));

    let change = ExpenseChange {
        status: Some(StatusText::ReadyForCreditor),
        ..ExpenseChange::default()
    };
    let lease = manager_caller().with_scope(scopes::LEASE_COORDINATOR);
    h.service
        .update(&lease, Role::Manager, ExpenseId(2), change)
        .await
        .unwrap();

    let csv = h
        .service
        .journal_csv(before, Utc::now() + Duration::minutes(1))
        .await
        .unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert!(csv.starts_with("Expenses_Id,Time,Attribute,Old value,New value,User"));
    assert!(csv.contains("2,"));
    assert!(csv.contains("status: text,ready_for_manager,ready_for_creditor"));
}
