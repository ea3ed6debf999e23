use crate::core::models::settlement::{Settlement, SettlementType};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Week,
    Month,
    Quarter,
}

impl DateRange {
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::All => None,
            DateRange::Week => Some(now - Duration::days(7)),
            DateRange::Month => now.checked_sub_months(Months::new(1)),
            DateRange::Quarter => now.checked_sub_months(Months::new(3)),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryFilter {
    /// Omit for both individual and complete settlements.
    pub settlement_type: Option<SettlementType>,
    #[serde(default)]
    pub date_range: DateRange,
    pub counterparty: Option<String>,
    pub search: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SettledExpense {
    pub expense_id: String,
    pub expense_title: Option<String>,
    pub amount: f64,
}

/// A settlement row with the names a reader needs to make sense of it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SettlementRecord {
    pub settlement: Settlement,
    pub payer_name: String,
    pub payee_name: String,
    pub expense_title: Option<String>,
    pub settled_expenses: Vec<SettledExpense>,
}

impl SettlementRecord {
    fn matches_search(&self, needle: &str) -> bool {
        let contains = |haystack: &str| haystack.to_lowercase().contains(needle);
        contains(&self.payer_name)
            || contains(&self.payee_name)
            || self.expense_title.as_deref().is_some_and(contains)
            || self
                .settled_expenses
                .iter()
                .any(|e| e.expense_title.as_deref().is_some_and(contains))
    }
}

/// Settled rows involving `user_id` that pass `filter`, newest first.
pub fn filter_history(
    user_id: &str,
    records: Vec<SettlementRecord>,
    filter: &HistoryFilter,
    now: DateTime<Utc>,
) -> Vec<SettlementRecord> {
    let since = filter.date_range.start(now);
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut records: Vec<SettlementRecord> = records
        .into_iter()
        .filter(|r| r.settlement.is_settled && r.settlement.involves(user_id))
        .filter(|r| {
            filter
                .settlement_type
                .is_none_or(|t| r.settlement.settlement_type == t)
        })
        .filter(|r| since.is_none_or(|start| r.settlement.settled_at >= start))
        .filter(|r| {
            filter
                .counterparty
                .as_deref()
                .is_none_or(|other| r.settlement.involves(other))
        })
        .filter(|r| needle.as_deref().is_none_or(|n| r.matches_search(n)))
        .collect();

    records.sort_by(|a, b| b.settlement.settled_at.cmp(&a.settlement.settled_at));
    records
}
