pub mod in_memory;

use crate::core::errors::RoomsplitError;
use crate::core::models::notification::{Notification, NotificationPayload, NotificationType};
use async_trait::async_trait;

/// Dispatcher for user-facing notifications. Delivery is best effort; callers
/// never let a failure here undo a ledger write.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        notification_type: NotificationType,
        recipient_id: &str,
        sender_id: &str,
        payload: NotificationPayload,
    ) -> Result<Notification, RoomsplitError>;
    /// Newest first.
    async fn list_for(&self, recipient_id: &str) -> Result<Vec<Notification>, RoomsplitError>;
    async fn get(&self, notification_id: &str) -> Result<Option<Notification>, RoomsplitError>;
    async fn mark_read(&self, notification_id: &str) -> Result<(), RoomsplitError>;
}
