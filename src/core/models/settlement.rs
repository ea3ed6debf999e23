use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettlementType {
    Individual,
    Complete,
}

impl std::fmt::Display for SettlementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SettlementType::Individual => "individual",
            SettlementType::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}

/// Per-expense slice of a complete settlement.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseShare {
    pub expense_id: String,
    pub amount: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Settlement {
    pub id: String,
    pub expense_id: Option<String>,
    pub payer_id: String,
    pub payee_id: String,
    pub amount: f64,
    pub is_settled: bool,
    pub settlement_type: SettlementType,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub settled_at: chrono::DateTime<chrono::Utc>,
    pub expense_details: Vec<ExpenseShare>,
}

impl Settlement {
    pub fn involves(&self, user_id: &str) -> bool {
        self.payer_id == user_id || self.payee_id == user_id
    }

    /// Whether this row evidences payment of `participant_id`'s share of `expense_id`.
    ///
    /// Individual rows cover their payer on their own expense. Complete rows cover
    /// both of their parties on every expense listed in `expense_details`.
    pub fn covers(&self, expense_id: &str, participant_id: &str) -> bool {
        if !self.is_settled {
            return false;
        }
        match self.settlement_type {
            SettlementType::Individual => {
                self.expense_id.as_deref() == Some(expense_id) && self.payer_id == participant_id
            }
            SettlementType::Complete => {
                self.involves(participant_id) && self.expense_details.iter().any(|d| d.expense_id == expense_id)
            }
        }
    }

    pub fn expense_ids(&self) -> Vec<&str> {
        match self.expense_id.as_deref() {
            Some(id) => vec![id],
            None => self.expense_details.iter().map(|d| d.expense_id.as_str()).collect(),
        }
    }
}
