//! Expense settlement accounting.
//!
//! Everything here is pure: callers fetch expenses, participant rows and settlement
//! rows from storage, wrap them in [`ExpenseLedger`]s and ask for shares, resolved
//! settlement state or aggregated balances.

use crate::core::errors::{Result, RoomsplitError};
use crate::core::models::{
    balance::{Balance, BalanceDirection, BreakdownItem},
    expense::{Expense, ExpenseStatus, StatusPerspective},
    participant::{ExpenseParty, Participant, PartyRole},
    settlement::{ExpenseShare, Settlement},
};
use std::collections::{HashMap, HashSet};

/// Net amounts below this magnitude are rounding noise, not obligations.
pub const BALANCE_EPSILON: f64 = 0.01;

const UNKNOWN_NAME: &str = "Unknown";

/// Equal share of `amount` across `participant_count` people. A count of zero is treated as one.
pub fn share_of(amount: f64, participant_count: usize) -> f64 {
    amount / participant_count.max(1) as f64
}

/// Effective settlement state of a participant row.
///
/// The flag alone is not trusted: a settled ledger row covering the pair counts too.
pub fn resolve_settled(participant: &Participant, settlements: &[Settlement]) -> bool {
    participant.settlement_status
        || settlements
            .iter()
            .any(|s| s.covers(&participant.expense_id, &participant.participant_id))
}

pub fn is_negligible(amount: f64) -> bool {
    amount.abs() < BALANCE_EPSILON
}

fn name_of(names: &HashMap<String, String>, user_id: &str) -> String {
    names.get(user_id).cloned().unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// An expense together with its participant rows and every settlement row touching it.
#[derive(Clone, Debug)]
pub struct ExpenseLedger {
    pub expense: Expense,
    pub participants: Vec<Participant>,
    pub settlements: Vec<Settlement>,
}

impl ExpenseLedger {
    /// Participant rows are deduplicated by user and any row naming the buyer is ignored.
    pub fn new(expense: Expense, participants: Vec<Participant>, settlements: Vec<Settlement>) -> Self {
        let mut seen = HashSet::new();
        let participants = participants
            .into_iter()
            .filter(|p| p.expense_id == expense.id)
            .filter(|p| p.participant_id != expense.buyer_id)
            .filter(|p| seen.insert(p.participant_id.clone()))
            .collect();
        let settlements = settlements
            .into_iter()
            .filter(|s| s.expense_ids().contains(&expense.id.as_str()))
            .collect();
        ExpenseLedger {
            expense,
            participants,
            settlements,
        }
    }

    pub fn id(&self) -> &str {
        &self.expense.id
    }

    /// Buyer plus every non-buyer participant.
    pub fn total_participants(&self) -> usize {
        self.participants.len() + 1
    }

    pub fn share(&self) -> f64 {
        share_of(self.expense.amount, self.total_participants())
    }

    pub fn participant(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.participant_id == user_id)
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.expense.is_buyer(user_id) || self.participant(user_id).is_some()
    }

    /// The buyer is always settled; users with no stake are reported unsettled.
    pub fn is_settled(&self, user_id: &str) -> bool {
        if self.expense.is_buyer(user_id) {
            return true;
        }
        self.participant(user_id)
            .map(|p| resolve_settled(p, &self.settlements))
            .unwrap_or(false)
    }

    pub fn unsettled_participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(|p| !resolve_settled(p, &self.settlements))
    }

    pub fn settled_count(&self) -> usize {
        self.participants.len() - self.unsettled_participants().count()
    }

    pub fn is_fully_settled(&self) -> bool {
        self.unsettled_participants().next().is_none()
    }

    pub fn parties(&self, names: &HashMap<String, String>) -> Vec<ExpenseParty> {
        let share = self.share();
        let buyer = ExpenseParty {
            user_id: self.expense.buyer_id.clone(),
            name: name_of(names, &self.expense.buyer_id),
            role: PartyRole::Buyer,
            share,
            settled: true,
        };
        std::iter::once(buyer)
            .chain(self.participants.iter().map(|p| ExpenseParty {
                user_id: p.participant_id.clone(),
                name: name_of(names, &p.participant_id),
                role: PartyRole::Participant,
                share,
                settled: resolve_settled(p, &self.settlements),
            }))
            .collect()
    }

    /// Progress as seen by `user_id`; `None` when the user is not a party.
    pub fn status_for(&self, user_id: &str) -> Option<ExpenseStatus> {
        if !self.involves(user_id) {
            return None;
        }
        if self.participants.is_empty() {
            return Some(ExpenseStatus {
                perspective: StatusPerspective::Solo,
                settled_count: 0,
                total_count: 0,
                fully_settled: true,
                progress: 100.0,
                label: "Settled".to_string(),
            });
        }
        if self.expense.is_buyer(user_id) {
            let settled = self.settled_count();
            let total = self.participants.len();
            return Some(ExpenseStatus {
                perspective: StatusPerspective::Buyer,
                settled_count: settled,
                total_count: total,
                fully_settled: settled == total,
                progress: settled as f64 / total as f64 * 100.0,
                label: format!("{}/{} paid", settled, total),
            });
        }
        let settled = self.is_settled(user_id);
        Some(ExpenseStatus {
            perspective: StatusPerspective::Participant,
            settled_count: usize::from(settled),
            total_count: 1,
            fully_settled: settled,
            progress: if settled { 100.0 } else { 0.0 },
            label: (if settled { "Paid" } else { "Pending" }).to_string(),
        })
    }

    fn breakdown_item(&self, names: &HashMap<String, String>) -> BreakdownItem {
        BreakdownItem {
            expense_id: self.expense.id.clone(),
            title: self.expense.title.clone(),
            category: self.expense.category,
            date: self.expense.created_at,
            total: self.expense.amount,
            share: self.share(),
            paid_by: self.expense.buyer_id.clone(),
            paid_by_name: name_of(names, &self.expense.buyer_id),
        }
    }
}

struct RunningBalance {
    net: f64,
    breakdown: Vec<BreakdownItem>,
}

/// Nets every unsettled share between `user_id` and each counterparty.
///
/// Positive `net_amount` means `user_id` owes the counterparty. Rows whose magnitude is
/// below [`BALANCE_EPSILON`] are dropped; the rest are ordered by descending magnitude.
pub fn aggregate_balances(
    user_id: &str,
    ledgers: &[ExpenseLedger],
    names: &HashMap<String, String>,
) -> Vec<Balance> {
    let mut running: HashMap<String, RunningBalance> = HashMap::new();
    let mut push = |counterparty: &str, delta: f64, item: BreakdownItem| {
        let entry = running.entry(counterparty.to_string()).or_insert(RunningBalance {
            net: 0.0,
            breakdown: Vec::new(),
        });
        entry.net += delta;
        entry.breakdown.push(item);
    };

    for ledger in ledgers {
        let share = ledger.share();
        if ledger.expense.is_buyer(user_id) {
            for participant in ledger.unsettled_participants() {
                push(&participant.participant_id, -share, ledger.breakdown_item(names));
            }
        } else if ledger.participant(user_id).is_some() && !ledger.is_settled(user_id) {
            push(&ledger.expense.buyer_id, share, ledger.breakdown_item(names));
        }
    }

    let mut balances: Vec<Balance> = running
        .into_iter()
        .filter(|(_, running)| !is_negligible(running.net))
        .map(|(counterparty_id, running)| Balance {
            counterparty_name: name_of(names, &counterparty_id),
            counterparty_id,
            net_amount: running.net,
            direction: if running.net > 0.0 {
                BalanceDirection::Owe
            } else {
                BalanceDirection::Owed
            },
            breakdown: running.breakdown,
        })
        .collect();

    balances.sort_by(|a, b| {
        b.amount()
            .total_cmp(&a.amount())
            .then_with(|| a.counterparty_id.cmp(&b.counterparty_id))
    });
    balances
}

/// Recomputes the signed net between `user_id` and `counterparty_id` from explicit legs.
///
/// Every leg must be an expense one of them bought while the other still owes a share,
/// and each leg's amount must match that share.
pub fn net_for_legs(
    user_id: &str,
    counterparty_id: &str,
    legs: &[ExpenseShare],
    ledgers: &HashMap<String, ExpenseLedger>,
) -> Result<f64> {
    let mut net = 0.0;
    let mut seen = HashSet::new();
    for leg in legs {
        if !seen.insert(leg.expense_id.as_str()) {
            return Err(RoomsplitError::InvalidSettlementExpense(leg.expense_id.clone()));
        }
        let ledger = ledgers
            .get(&leg.expense_id)
            .ok_or_else(|| RoomsplitError::ExpenseNotFound(leg.expense_id.clone()))?;

        let sign = if ledger.expense.is_buyer(user_id) && ledger.participant(counterparty_id).is_some() {
            if ledger.is_settled(counterparty_id) {
                return Err(RoomsplitError::InvalidSettlementExpense(leg.expense_id.clone()));
            }
            -1.0
        } else if ledger.expense.is_buyer(counterparty_id) && ledger.participant(user_id).is_some() {
            if ledger.is_settled(user_id) {
                return Err(RoomsplitError::InvalidSettlementExpense(leg.expense_id.clone()));
            }
            1.0
        } else {
            return Err(RoomsplitError::InvalidSettlementExpense(leg.expense_id.clone()));
        };

        let share = ledger.share();
        if !is_negligible(leg.amount - share) {
            return Err(RoomsplitError::InvalidSettlementAmount {
                given: leg.amount,
                expected: share,
            });
        }
        net += sign * share;
    }
    Ok(net)
}
