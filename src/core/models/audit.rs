use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AppLog {
    pub id: String,
    pub action: String,
    pub user_id: Option<String>,
    #[schema(value_type = Object)]
    pub details: HashMap<String, serde_json::Value>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub timestamp: DateTime<Utc>,
}

impl AppLog {
    /// Whether `user_id` made this write or is named in it as a party.
    pub fn concerns(&self, user_id: &str) -> bool {
        if self.user_id.as_deref() == Some(user_id) {
            return true;
        }
        let named = |key: &str| self.details.get(key).and_then(|v| v.as_str()) == Some(user_id);
        named("payer_id")
            || named("payee_id")
            || named("counterparty_id")
            || self
                .details
                .get("participant_ids")
                .and_then(|v| v.as_array())
                .is_some_and(|ids| ids.iter().any(|id| id.as_str() == Some(user_id)))
    }
}
