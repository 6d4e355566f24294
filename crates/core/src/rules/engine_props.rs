//! Property-based tests for the business rule engine.

use chrono::Utc;
use claimflow_shared::ExpenseId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::expense::EmployeeRecord;
use crate::rules::{BusinessRuleEngine, RuleViolation};
use crate::testing::{employee_record, expense};
use crate::workflow::StatusText;

/// Strategy for amounts between 0.01 and 1000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_status() -> impl Strategy<Value = StatusText> {
    prop::sample::select(StatusText::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The minimum amount rule rejects exactly the amounts at or below the floor.
    #[test]
    fn prop_minimum_amount_is_inclusive_floor(amount in arb_amount()) {
        let engine = BusinessRuleEngine::default();
        let employee = EmployeeRecord {
            company: engine.config().minimum_amount.company.clone(),
            ..employee_record()
        };

        let result = engine.validate(amount, &employee, Utc::now());
        let floor = engine.config().minimum_amount.floor;
        if amount <= floor {
            prop_assert_eq!(result, Err(RuleViolation::MinimumAmount { floor }));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// Duplicate flags are sorted, never contain the candidate, and only
    /// point at submitted claims.
    #[test]
    fn prop_duplicates_are_sorted_submitted_claims(
        statuses in prop::collection::vec(arb_status(), 0..12),
    ) {
        let engine = BusinessRuleEngine::default();
        let candidate = expense(1_000, StatusText::ReadyForManager);
        let others: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| expense(i64::try_from(i).unwrap_or(0) + 1, *status))
            .collect();

        let flags = engine.duplicates(&candidate, &others);
        let expected: Vec<ExpenseId> = others
            .iter()
            .filter(|e| !matches!(e.status.text, StatusText::Draft | StatusText::Cancelled))
            .map(|e| e.id)
            .collect();

        match flags {
            None => prop_assert!(expected.is_empty()),
            Some(flags) => {
                prop_assert!(flags.duplicates.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(!flags.duplicates.contains(&candidate.id));
                prop_assert_eq!(flags.duplicates, expected);
            }
        }
    }
}
