//! Store manager that dispatches to the configured provider.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use roomkey_core::config::store::StoreConfig;
use roomkey_core::error::AppError;
use roomkey_core::result::AppResult;
use roomkey_core::traits::{MessageStream, ReleaseOutcome, StoreProvider};
use roomkey_core::types::{RoomId, RoomKey};

/// Store manager that wraps the configured store provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store provider.
    inner: Arc<dyn StoreProvider>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn StoreProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis store provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisStoreProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory store provider");
                Arc::new(crate::memory::MemoryStoreProvider::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn StoreProvider>) -> Self {
        Self { inner: provider }
    }

    /// Create a store manager backed by a fresh in-memory provider.
    #[cfg(feature = "memory")]
    pub fn in_memory() -> Self {
        Self::from_provider(Arc::new(crate::memory::MemoryStoreProvider::default()))
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn StoreProvider {
        self.inner.as_ref()
    }
}

#[async_trait]
impl StoreProvider for StoreManager {
    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.set_add(key, member).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.set_remove(key, member).await
    }

    async fn set_is_member(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.set_is_member(key, member).await
    }

    async fn set_pop(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.set_pop(key).await
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        self.inner.set_members(key).await
    }

    async fn set_card(&self, key: &str) -> AppResult<u64> {
        self.inner.set_card(key).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        self.inner.hash_get(key, field).await
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> AppResult<()> {
        self.inner.hash_set(key, field, value).await
    }

    async fn hash_set_many(&self, key: &str, fields: &[(String, String)]) -> AppResult<()> {
        self.inner.hash_set_many(key, fields).await
    }

    async fn hash_delete(&self, key: &str, field: &str) -> AppResult<bool> {
        self.inner.hash_delete(key, field).await
    }

    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>> {
        self.inner.hash_get_all(key).await
    }

    async fn list_push(&self, key: &str, value: &str) -> AppResult<u64> {
        self.inner.list_push(key, value).await
    }

    async fn list_remove(&self, key: &str, value: &str) -> AppResult<u64> {
        self.inner.list_remove(key, value).await
    }

    async fn list_index(&self, key: &str, index: i64) -> AppResult<Option<String>> {
        self.inner.list_index(key, index).await
    }

    async fn list_position(&self, key: &str, value: &str) -> AppResult<Option<u64>> {
        self.inner.list_position(key, value).await
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> AppResult<Vec<String>> {
        self.inner.list_range(key, start, stop).await
    }

    async fn publish(&self, channel: &str, payload: &str) -> AppResult<u64> {
        self.inner.publish(channel, payload).await
    }

    async fn subscribe(&self, channel: &str) -> AppResult<MessageStream> {
        self.inner.subscribe(channel).await
    }

    async fn reset(&self) -> AppResult<()> {
        self.inner.reset().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn init_counter(&self) -> AppResult<()> {
        self.inner.init_counter().await
    }

    async fn next_room_id(&self) -> AppResult<RoomId> {
        self.inner.next_room_id().await
    }

    async fn populate_key_pool(&self, candidates: &[RoomKey]) -> AppResult<u64> {
        self.inner.populate_key_pool(candidates).await
    }

    async fn claim_key_for_room(&self, room_id: RoomId) -> AppResult<Option<RoomKey>> {
        self.inner.claim_key_for_room(room_id).await
    }

    async fn release_key(&self, room_id: RoomId, key: &RoomKey) -> AppResult<ReleaseOutcome> {
        self.inner.release_key(room_id, key).await
    }
}
