//! Property-based tests for the expense state machine.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::cost_type::CostType;
use crate::expense::ExpenseChange;
use crate::testing::{
    MANAGER_NUMBER, creditor_caller, employee_caller, expense, manager_caller,
};
use crate::workflow::{Actor, ExpenseStateMachine, Role, StatusText, TransitionContext};

fn arb_status() -> impl Strategy<Value = StatusText> {
    prop::sample::select(StatusText::ALL.to_vec())
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

/// Strategy for amounts between 10.01 and 200.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1_001i64..=20_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn actor_for(role: Role) -> Actor {
    match role {
        Role::Employee => Actor::new(role, &employee_caller(), None),
        Role::Manager => Actor::new(role, &manager_caller(), Some(MANAGER_NUMBER.to_string())),
        Role::Creditor | Role::Controller => Actor::new(role, &creditor_caller(), None),
        Role::System => Actor::system(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Only table edges are followed
    // =========================================================================

    /// Any edge outside the role's table fails as an unauthorized transition;
    /// any edge inside it lands on an allowed target.
    #[test]
    fn prop_only_table_edges_are_followed(
        role in arb_role(),
        from in arb_status(),
        to in arb_status(),
        amount in arb_amount(),
    ) {
        let machine = ExpenseStateMachine::default();
        let cost_type = CostType::new("430110", "430110");
        let mut current = expense(1, from);
        current.amount = amount;
        let change = ExpenseChange {
            status: Some(to),
            rnote_id: Some(1),
            ..ExpenseChange::default()
        };
        let ctx = TransitionContext {
            now: Utc::now(),
            cost_type: Some(&cost_type),
            has_attachments: true,
        };

        let allowed = role.allowed_targets(from);
        let result = machine.apply(&actor_for(role), &current, &change, &ctx);

        if allowed.contains(&to) {
            let next = result.expect("table edge must apply");
            prop_assert!(allowed.contains(&next.status.text));
            prop_assert_eq!(next.id, current.id);
            prop_assert_eq!(next.employee, current.employee);
            prop_assert_eq!(next.claim_date, current.claim_date);
        } else {
            let err = result.expect_err("edge outside the table must fail");
            prop_assert!(err.is_unauthorized_transition());
        }
    }

    /// Submissions are routed by amount against the cost type minimum.
    #[test]
    fn prop_submission_routing(
        cents in 1i64..=20_000,
        min_cents in 0i64..=10_000,
        from in prop::sample::select(vec![
            StatusText::Draft,
            StatusText::RejectedByManager,
            StatusText::RejectedByCreditor,
        ]),
    ) {
        let amount = Decimal::new(cents, 2);
        let min_amount = Decimal::new(min_cents, 2);
        let cost_type = CostType::new("430110", "430110").with_min_amount(min_amount);

        let routed = ExpenseStateMachine::route_submission(&cost_type, amount);
        if min_amount.is_zero() || amount >= min_amount {
            prop_assert_eq!(routed, StatusText::ReadyForManager);
        } else {
            prop_assert_eq!(routed, StatusText::ReadyForCreditor);
        }
        prop_assert!(Role::Employee.allowed_targets(from).contains(&routed));
    }

    /// Claims that are not approved can never be marked exported.
    #[test]
    fn prop_mark_exported_only_from_approved(from in arb_status()) {
        let current = expense(1, from);
        let result = ExpenseStateMachine::mark_exported(&current, Utc::now());
        prop_assert_eq!(result.is_ok(), from == StatusText::Approved);
    }
}
