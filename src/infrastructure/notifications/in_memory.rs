use crate::core::errors::RoomsplitError;
use crate::core::models::notification::{Notification, NotificationPayload, NotificationType};
use crate::infrastructure::notifications::Notifier;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryNotifier {
    notifications: Arc<RwLock<Vec<Notification>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        InMemoryNotifier::default()
    }

    /// Makes every subsequent `notify` fail, mimicking an unreachable delivery channel.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(
        &self,
        notification_type: NotificationType,
        recipient_id: &str,
        sender_id: &str,
        payload: NotificationPayload,
    ) -> Result<Notification, RoomsplitError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RoomsplitError::NotificationError(
                "notification channel unavailable".to_string(),
            ));
        }
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            notification_type,
            recipient_id: recipient_id.to_string(),
            sender_id: sender_id.to_string(),
            expense_id: payload.expense_id,
            settlement_id: payload.settlement_id,
            participant_id: payload.participant_id,
            amount: payload.amount,
            metadata: payload.metadata,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn list_for(&self, recipient_id: &str) -> Result<Vec<Notification>, RoomsplitError> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .rev()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect())
    }

    async fn get(&self, notification_id: &str) -> Result<Option<Notification>, RoomsplitError> {
        let notifications = self.notifications.read().await;
        Ok(notifications.iter().find(|n| n.id == notification_id).cloned())
    }

    async fn mark_read(&self, notification_id: &str) -> Result<(), RoomsplitError> {
        let mut notifications = self.notifications.write().await;
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| RoomsplitError::NotificationNotFound(notification_id.to_string()))?;
        notification.is_read = true;
        Ok(())
    }
}
