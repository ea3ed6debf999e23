use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Every type the notifications table accepts. `ExpenseUpdated` and
/// `PaymentReceived` are never sent by this service (expenses are immutable
/// and payments are recorded as settlements) but rows written by other
/// clients still deserialize.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ExpenseCreated,
    ExpenseUpdated,
    IndividualSettlement,
    BalanceSettlement,
    PaymentReminder,
    NewRoommate,
    PaymentReceived,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct NotificationPayload {
    pub expense_id: Option<String>,
    pub settlement_id: Option<String>,
    pub participant_id: Option<String>,
    pub amount: Option<f64>,
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub recipient_id: String,
    pub sender_id: String,
    pub expense_id: Option<String>,
    pub settlement_id: Option<String>,
    pub participant_id: Option<String>,
    pub amount: Option<f64>,
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}
