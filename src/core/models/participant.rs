use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Row linking a non-buyer user to an expense they share.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Participant {
    pub expense_id: String,
    pub participant_id: String,
    pub settlement_status: bool,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartyRole {
    Buyer,
    Participant,
}

impl std::fmt::Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PartyRole::Buyer => "BUYER",
            PartyRole::Participant => "PARTICIPANT",
        };
        write!(f, "{}", s)
    }
}

/// One side of an expense as seen after resolving settlement state.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseParty {
    pub user_id: String,
    pub name: String,
    pub role: PartyRole,
    pub share: f64,
    pub settled: bool,
}

impl ExpenseParty {
    pub fn is_buyer(&self) -> bool {
        self.role == PartyRole::Buyer
    }
}
