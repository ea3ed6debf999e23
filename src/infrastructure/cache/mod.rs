pub mod cache_keys;
pub mod in_memory;

use crate::core::errors::RoomsplitError;
use crate::core::models::balance::Balance;
use async_trait::async_trait;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_user_balances(&self, user_id: &str) -> Result<Option<Vec<Balance>>, RoomsplitError>;
    async fn save_user_balances(
        &self,
        user_id: &str,
        balances: &[Balance],
        ttl: std::time::Duration,
    ) -> Result<(), RoomsplitError>;
    async fn invalidate_user_balances(&self, user_ids: &[&str]) -> Result<(), RoomsplitError>;
}
