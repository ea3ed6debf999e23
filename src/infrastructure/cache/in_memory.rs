use crate::core::errors::RoomsplitError;
use crate::core::models::balance::Balance;
use crate::infrastructure::cache::{Cache, cache_keys::user_balances_key};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryCache {
    cache: Arc<RwLock<HashMap<String, (Vec<Balance>, DateTime<Utc>)>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_user_balances(&self, user_id: &str) -> Result<Option<Vec<Balance>>, RoomsplitError> {
        let cache = self.cache.read().await;
        Ok(cache
            .get(&user_balances_key(user_id))
            .filter(|(_, expiry)| *expiry > Utc::now())
            .map(|(balances, _)| balances.clone()))
    }

    async fn save_user_balances(
        &self,
        user_id: &str,
        balances: &[Balance],
        ttl: std::time::Duration,
    ) -> Result<(), RoomsplitError> {
        let expiry = Utc::now()
            + chrono::Duration::from_std(ttl)
                .map_err(|e| RoomsplitError::CacheError(format!("Failed to convert TTL: {}", e)))?;
        let mut cache = self.cache.write().await;
        cache.insert(user_balances_key(user_id), (balances.to_vec(), expiry));
        Ok(())
    }

    async fn invalidate_user_balances(&self, user_ids: &[&str]) -> Result<(), RoomsplitError> {
        let mut cache = self.cache.write().await;
        for user_id in user_ids {
            cache.remove(&user_balances_key(user_id));
        }
        let now = Utc::now();
        cache.retain(|_, (_, expiry)| *expiry > now);
        Ok(())
    }
}
