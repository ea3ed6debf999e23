pub mod in_memory;

use crate::core::errors::RoomsplitError;
use crate::core::models::audit::AppLog;
use async_trait::async_trait;

/// Action log of ledger writes, kept apart from process tracing.
#[async_trait]
pub trait LoggingService: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), RoomsplitError>;
    /// Entries the user made or is a party to, newest first.
    async fn logs_for_user(&self, user_id: &str) -> Result<Vec<AppLog>, RoomsplitError>;
}
