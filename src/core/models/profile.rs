use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// UPI handle used as the payment address, e.g. `alice@okbank`.
    pub upi_id: Option<String>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn payment_address(&self) -> Option<&str> {
        self.upi_id.as_deref().filter(|upi| !upi.trim().is_empty())
    }
}
