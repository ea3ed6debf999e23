use crate::core::errors::RoomsplitError;
use crate::core::models::audit::AppLog;
use crate::infrastructure::logging::LoggingService;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryLogging {
    logs: Arc<RwLock<Vec<AppLog>>>,
}

impl InMemoryLogging {
    pub fn new() -> Self {
        InMemoryLogging::default()
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), RoomsplitError> {
        let details = match details {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            other => {
                return Err(RoomsplitError::LoggingError(format!(
                    "{} details must be a JSON object, got {}",
                    action, other
                )));
            }
        };
        let mut logs = self.logs.write().await;
        logs.push(AppLog {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            user_id: user_id.map(String::from),
            details,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    async fn logs_for_user(&self, user_id: &str) -> Result<Vec<AppLog>, RoomsplitError> {
        let logs = self.logs.read().await;
        Ok(logs.iter().rev().filter(|log| log.concerns(user_id)).cloned().collect())
    }
}
