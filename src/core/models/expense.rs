use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Travel,
    Rent,
    Utilities,
    Misc,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Food => "food",
            Category::Travel => "travel",
            Category::Rent => "rent",
            Category::Utilities => "utilities",
            Category::Misc => "misc",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub category: Option<Category>,
    pub buyer_id: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn is_buyer(&self, user_id: &str) -> bool {
        self.buyer_id == user_id
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusPerspective {
    Buyer,
    Participant,
    /// Nobody besides the buyer shares the expense.
    Solo,
}

/// Settlement progress of an expense as one of its parties sees it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseStatus {
    pub perspective: StatusPerspective,
    pub settled_count: usize,
    pub total_count: usize,
    pub fully_settled: bool,
    pub progress: f64,
    pub label: String,
}
