//! Expense repository semantics and per-expense transaction isolation.

#![allow(clippy::items_after_statements)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use claimflow_core::expense::{
    EmployeeRecord, EmployeeSnapshot, Expense, ExpenseFilter, ExpenseStore, ManagerType, Status,
    StoreError,
};
use claimflow_core::workflow::{StatusText, UNASSIGNED_ID};
use claimflow_db::ExpenseRepository;
use claimflow_shared::ExpenseId;
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rstest::rstest;
use tokio::sync::Barrier;

fn draft(email: &str, amount: Decimal) -> Expense {
    Expense {
        id: UNASSIGNED_ID,
        amount,
        note: String::new(),
        cost_type: "430110".to_string(),
        transaction_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        claim_date: Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
        manager_type: ManagerType::Linemanager,
        employee: EmployeeSnapshot {
            email: email.to_string(),
            given_name: None,
            family_name: None,
            full_name: "Test".to_string(),
            afas_data: EmployeeRecord {
                employee_number: "2001".to_string(),
                manager_number: Some("1001".to_string()),
                company: "VWT BV".to_string(),
                department_code: None,
                department_description: None,
                iban: "NL91ABNA0417164300".to_string(),
                display_name: "Test".to_string(),
                date_in_service: None,
                date_out_service: None,
            },
        },
        status: Status::draft(),
        flags: None,
    }
}

#[tokio::test]
async fn test_create_assigns_monotonic_ids() {
    let repo = ExpenseRepository::new();
    let a = repo.create(draft("a@example.com", dec!(1))).await.unwrap();
    let b = repo.create(draft("a@example.com", dec!(2))).await.unwrap();

    assert_eq!(a.id, ExpenseId(1));
    assert_eq!(b.id, ExpenseId(2));
    assert_eq!(repo.get(ExpenseId(2)).await.unwrap().unwrap().amount, dec!(2));
    assert!(repo.get(ExpenseId(3)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_insert_bumps_next_id() {
    let repo = ExpenseRepository::new();
    let mut seeded = draft("a@example.com", dec!(1));
    seeded.id = ExpenseId(41);
    repo.insert(seeded);

    let created = repo.create(draft("a@example.com", dec!(2))).await.unwrap();
    assert_eq!(created.id, ExpenseId(42));
}

#[rstest]
#[case("a@example.com", vec![1, 3])]
#[case("A@EXAMPLE.COM", vec![1, 3])]
#[case("b@example.com", vec![2])]
#[case("nobody@example.com", vec![])]
#[tokio::test]
async fn test_list_filters_by_email_and_orders_by_id(#[case] email: &str, #[case] expected: Vec<i64>) {
    let repo = ExpenseRepository::new();
    for (owner, amount) in [
        ("a@example.com", dec!(10)),
        ("b@example.com", dec!(20)),
        ("A@Example.com", dec!(30)),
    ] {
        repo.create(draft(owner, amount)).await.unwrap();
    }

    let listed = repo
        .list(&ExpenseFilter {
            employee_email: Some(email.to_string()),
            ..ExpenseFilter::default()
        })
        .await
        .unwrap();
    let ids: Vec<ExpenseId> = listed.iter().map(|e| e.id).collect();
    let expected: Vec<ExpenseId> = expected.into_iter().map(ExpenseId).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_begin_unknown_is_not_found() {
    let repo = ExpenseRepository::new();
    let err = repo.begin(ExpenseId(9)).await.err().unwrap();
    assert!(matches!(err, StoreError::NotFound(ExpenseId(9))));
}

#[tokio::test]
async fn test_dropped_transaction_writes_nothing() {
    let repo = ExpenseRepository::new();
    let created = repo.create(draft("a@example.com", dec!(5))).await.unwrap();

    {
        let tx = repo.begin(created.id).await.unwrap();
        assert_eq!(tx.current().amount, dec!(5));
    }

    let tx = repo.begin(created.id).await.unwrap();
    let mut next = tx.current().clone();
    next.status.text = StatusText::ReadyForManager;
    tx.commit(next).await.unwrap();

    let stored = repo.get(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status.text, StatusText::ReadyForManager);
}

#[tokio::test]
async fn test_reads_do_not_wait_for_open_transaction() {
    let repo = ExpenseRepository::new();
    let created = repo.create(draft("a@example.com", dec!(5))).await.unwrap();

    let _tx = repo.begin(created.id).await.unwrap();
    assert!(repo.get(created.id).await.unwrap().is_some());
    assert_eq!(repo.list(&ExpenseFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_commit_of_other_expense_is_rejected() {
    let repo = ExpenseRepository::new();
    let a = repo.create(draft("a@example.com", dec!(5))).await.unwrap();
    let b = repo.create(draft("a@example.com", dec!(6))).await.unwrap();

    let tx = repo.begin(a.id).await.unwrap();
    let err = tx.commit(b).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
}

/// Concurrent read-modify-write on one claim loses no update.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transactions_are_serialized() {
    const WRITERS: usize = 50;

    let repo = Arc::new(ExpenseRepository::new());
    let created = repo.create(draft("a@example.com", dec!(0))).await.unwrap();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles = (0..WRITERS).map(|_| {
        let repo = Arc::clone(&repo);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            let tx = repo.begin(created.id).await.unwrap();
            let mut next = tx.current().clone();
            tokio::task::yield_now().await;
            next.amount += Decimal::ONE;
            tx.commit(next).await.unwrap();
        })
    });
    for result in join_all(handles).await {
        result.unwrap();
    }

    let stored = repo.get(created.id).await.unwrap().unwrap();
    assert_eq!(stored.amount, Decimal::from(WRITERS as u64));
}
