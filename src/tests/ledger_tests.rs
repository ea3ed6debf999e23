use crate::core::errors::RoomsplitError;
use crate::core::ledger::{ExpenseLedger, aggregate_balances, net_for_legs, resolve_settled, share_of};
use crate::core::models::balance::BalanceDirection;
use crate::core::models::expense::StatusPerspective;
use crate::core::models::settlement::{ExpenseShare, Settlement, SettlementType};
use crate::tests::{expense, participant};
use chrono::Utc;
use std::collections::HashMap;

fn names() -> HashMap<String, String> {
    [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")]
        .into_iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect()
}

fn individual(expense_id: &str, payer: &str, payee: &str, amount: f64) -> Settlement {
    Settlement {
        id: format!("s-{}-{}", expense_id, payer),
        expense_id: Some(expense_id.to_string()),
        payer_id: payer.to_string(),
        payee_id: payee.to_string(),
        amount,
        is_settled: true,
        settlement_type: SettlementType::Individual,
        settled_at: Utc::now(),
        expense_details: Vec::new(),
    }
}

fn complete(payer: &str, payee: &str, legs: &[(&str, f64)]) -> Settlement {
    Settlement {
        id: format!("c-{}-{}", payer, payee),
        expense_id: None,
        payer_id: payer.to_string(),
        payee_id: payee.to_string(),
        amount: legs.iter().map(|(_, a)| a).sum(),
        is_settled: true,
        settlement_type: SettlementType::Complete,
        settled_at: Utc::now(),
        expense_details: legs
            .iter()
            .map(|(id, amount)| ExpenseShare {
                expense_id: id.to_string(),
                amount: *amount,
            })
            .collect(),
    }
}

#[test]
fn test_shares_sum_to_amount() {
    for (amount, count) in [(100.0, 3), (0.01, 2), (999_999.99, 7), (45.5, 1)] {
        let total = share_of(amount, count) * count as f64;
        assert!((total - amount).abs() < 1e-6, "{} split {} ways", amount, count);
    }
    assert_eq!(share_of(80.0, 0), 80.0);
}

#[test]
fn test_buyer_and_duplicate_rows_do_not_change_share() {
    let ledger = ExpenseLedger::new(
        expense("e1", "alice", 90.0),
        vec![
            participant("e1", "bob", false),
            participant("e1", "bob", false),
            participant("e1", "alice", false),
            participant("e1", "carol", false),
            participant("other", "dave", false),
        ],
        Vec::new(),
    );
    assert_eq!(ledger.total_participants(), 3);
    assert_eq!(ledger.share(), 30.0);
}

#[test]
fn test_resolver_trusts_settlement_rows_over_flag() {
    let row = participant("e1", "bob", false);
    assert!(!resolve_settled(&row, &[]));
    assert!(resolve_settled(&row, &[individual("e1", "bob", "alice", 30.0)]));
    assert!(!resolve_settled(&row, &[individual("e2", "bob", "alice", 30.0)]));
    assert!(!resolve_settled(&row, &[individual("e1", "carol", "alice", 30.0)]));

    // A complete settlement covers both parties on every listed expense.
    assert!(resolve_settled(&row, &[complete("alice", "bob", &[("e1", 30.0)])]));
    assert!(resolve_settled(&row, &[complete("bob", "alice", &[("e1", 30.0)])]));
    assert!(!resolve_settled(&row, &[complete("carol", "alice", &[("e1", 30.0)])]));

    assert!(resolve_settled(&participant("e1", "bob", true), &[]));
}

#[test]
fn test_buyer_is_always_settled() {
    let ledger = ExpenseLedger::new(expense("e1", "alice", 60.0), vec![participant("e1", "bob", false)], vec![]);
    assert!(ledger.is_settled("alice"));
    assert!(!ledger.is_settled("bob"));
    assert!(!ledger.is_settled("stranger"));
}

#[test]
fn test_status_perspectives() {
    let ledger = ExpenseLedger::new(
        expense("e1", "alice", 90.0),
        vec![participant("e1", "bob", true), participant("e1", "carol", false)],
        vec![],
    );

    let buyer = ledger.status_for("alice").unwrap();
    assert_eq!(buyer.perspective, StatusPerspective::Buyer);
    assert_eq!(buyer.label, "1/2 paid");
    assert_eq!(buyer.progress, 50.0);
    assert!(!buyer.fully_settled);

    assert_eq!(ledger.status_for("bob").unwrap().label, "Paid");
    assert_eq!(ledger.status_for("carol").unwrap().label, "Pending");
    assert!(ledger.status_for("dave").is_none());

    let solo = ExpenseLedger::new(expense("e2", "alice", 40.0), vec![], vec![]);
    let status = solo.status_for("alice").unwrap();
    assert_eq!(status.perspective, StatusPerspective::Solo);
    assert!(status.fully_settled);
    assert_eq!(status.label, "Settled");
}

#[test]
fn test_groceries_balances_from_both_sides() {
    let ledgers = vec![ExpenseLedger::new(
        expense("groceries", "alice", 300.0),
        vec![participant("groceries", "bob", false), participant("groceries", "carol", false)],
        vec![],
    )];

    let alice = aggregate_balances("alice", &ledgers, &names());
    assert_eq!(alice.len(), 2);
    assert!(alice.iter().all(|b| b.direction == BalanceDirection::Owed));
    assert!(alice.iter().all(|b| (b.net_amount + 100.0).abs() < 1e-9));

    let bob = aggregate_balances("bob", &ledgers, &names());
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].counterparty_id, "alice");
    assert_eq!(bob[0].counterparty_name, "Alice");
    assert_eq!(bob[0].direction, BalanceDirection::Owe);
    assert!((bob[0].net_amount - 100.0).abs() < 1e-9);
    assert_eq!(bob[0].breakdown.len(), 1);
    assert_eq!(bob[0].breakdown[0].paid_by_name, "Alice");
}

#[test]
fn test_balances_are_antisymmetric_and_net_across_expenses() {
    let ledgers = vec![
        ExpenseLedger::new(expense("e1", "alice", 100.0), vec![participant("e1", "bob", false)], vec![]),
        ExpenseLedger::new(expense("e2", "bob", 30.0), vec![participant("e2", "alice", false)], vec![]),
        ExpenseLedger::new(
            expense("e3", "bob", 90.0),
            vec![participant("e3", "alice", false), participant("e3", "carol", false)],
            vec![],
        ),
    ];
    let alice = aggregate_balances("alice", &ledgers, &names());
    let bob = aggregate_balances("bob", &ledgers, &names());

    let alice_to_bob = alice.iter().find(|b| b.counterparty_id == "bob").unwrap();
    let bob_to_alice = bob.iter().find(|b| b.counterparty_id == "alice").unwrap();
    // 50 owed to alice, 15 + 30 owed by alice
    assert!((alice_to_bob.net_amount + 5.0).abs() < 1e-9);
    assert!((alice_to_bob.net_amount + bob_to_alice.net_amount).abs() < 1e-9);
    assert_eq!(alice_to_bob.breakdown.len(), 3);
}

#[test]
fn test_balances_drop_negligible_rows_and_sort_by_magnitude() {
    let ledgers = vec![
        ExpenseLedger::new(expense("tiny", "alice", 0.018), vec![participant("tiny", "bob", false)], vec![]),
        ExpenseLedger::new(expense("edge", "alice", 0.02), vec![participant("edge", "dave", false)], vec![]),
        ExpenseLedger::new(expense("big", "alice", 500.0), vec![participant("big", "carol", false)], vec![]),
    ];
    let balances = aggregate_balances("alice", &ledgers, &names());
    let ids: Vec<&str> = balances.iter().map(|b| b.counterparty_id.as_str()).collect();
    // 0.009 is noise; exactly 0.01 is kept
    assert_eq!(ids, vec!["carol", "dave"]);
    assert_eq!(balances[1].counterparty_name, "Unknown");
}

#[test]
fn test_settled_shares_leave_balances() {
    let ledgers = vec![ExpenseLedger::new(
        expense("e1", "alice", 90.0),
        vec![participant("e1", "bob", false), participant("e1", "carol", false)],
        vec![individual("e1", "bob", "alice", 30.0)],
    )];
    let balances = aggregate_balances("alice", &ledgers, &names());
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].counterparty_id, "carol");
}

#[test]
fn test_net_for_legs_signs_and_rejections() {
    let mut ledgers = HashMap::new();
    for ledger in [
        ExpenseLedger::new(expense("e1", "bob", 300.0), vec![participant("e1", "alice", false)], vec![]),
        ExpenseLedger::new(expense("e2", "alice", 100.0), vec![participant("e2", "bob", false)], vec![]),
        ExpenseLedger::new(expense("e3", "bob", 50.0), vec![participant("e3", "alice", true)], vec![]),
        ExpenseLedger::new(expense("e4", "carol", 50.0), vec![participant("e4", "alice", false)], vec![]),
    ] {
        ledgers.insert(ledger.id().to_string(), ledger);
    }
    let leg = |id: &str, amount: f64| ExpenseShare {
        expense_id: id.to_string(),
        amount,
    };

    let net = net_for_legs("alice", "bob", &[leg("e1", 150.0), leg("e2", 50.0)], &ledgers).unwrap();
    assert!((net - 100.0).abs() < 1e-9);

    assert!(matches!(
        net_for_legs("alice", "bob", &[leg("e1", 150.0), leg("e1", 150.0)], &ledgers),
        Err(RoomsplitError::InvalidSettlementExpense(_))
    ));
    assert!(matches!(
        net_for_legs("alice", "bob", &[leg("e3", 25.0)], &ledgers),
        Err(RoomsplitError::InvalidSettlementExpense(_))
    ));
    assert!(matches!(
        net_for_legs("alice", "bob", &[leg("e4", 25.0)], &ledgers),
        Err(RoomsplitError::InvalidSettlementExpense(_))
    ));
    assert!(matches!(
        net_for_legs("alice", "bob", &[leg("e1", 100.0)], &ledgers),
        Err(RoomsplitError::InvalidSettlementAmount { .. })
    ));
    assert!(matches!(
        net_for_legs("alice", "bob", &[leg("missing", 1.0)], &ledgers),
        Err(RoomsplitError::ExpenseNotFound(_))
    ));
}
