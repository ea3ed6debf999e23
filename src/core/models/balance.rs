use super::expense::Category;
use super::settlement::ExpenseShare;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BalanceDirection {
    /// The current user owes the counterparty.
    Owe,
    /// The counterparty owes the current user.
    Owed,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BreakdownItem {
    pub expense_id: String,
    pub title: String,
    pub category: Option<Category>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub date: DateTime<Utc>,
    pub total: f64,
    pub share: f64,
    pub paid_by: String,
    pub paid_by_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Balance {
    pub counterparty_id: String,
    pub counterparty_name: String,
    /// Positive when the current user owes, negative when they are owed.
    pub net_amount: f64,
    pub direction: BalanceDirection,
    pub breakdown: Vec<BreakdownItem>,
}

impl Balance {
    pub fn amount(&self) -> f64 {
        self.net_amount.abs()
    }

    pub fn legs(&self) -> Vec<ExpenseShare> {
        self.breakdown
            .iter()
            .map(|item| ExpenseShare {
                expense_id: item.expense_id.clone(),
                amount: item.share,
            })
            .collect()
    }
}
