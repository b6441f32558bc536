//! In-memory store provider.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use roomkey_core::config::store::MemoryStoreConfig;
use roomkey_core::result::AppResult;
use roomkey_core::traits::{MessageStream, ReleaseOutcome, StoreProvider};
use roomkey_core::types::{RoomId, RoomKey};

use super::keyspace::Keyspace;
use super::pubsub::MemoryPubSub;

/// In-memory store provider using a Tokio mutex for atomicity.
///
/// Suitable for single-node deployments and tests. Every call takes the
/// same lock, so each atomic procedure is trivially indivisible.
#[derive(Debug, Clone)]
pub struct MemoryStoreProvider {
    /// Protected keyspace.
    keyspace: Arc<Mutex<Keyspace>>,
    /// Channel fan-out.
    pubsub: Arc<MemoryPubSub>,
}

impl MemoryStoreProvider {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryStoreConfig) -> Self {
        Self {
            keyspace: Arc::new(Mutex::new(Keyspace::new())),
            pubsub: Arc::new(MemoryPubSub::new(config.channel_capacity)),
        }
    }
}

impl Default for MemoryStoreProvider {
    fn default() -> Self {
        Self::new(&MemoryStoreConfig::default())
    }
}

#[async_trait]
impl StoreProvider for MemoryStoreProvider {
    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool> {
        Ok(self.keyspace.lock().await.set_add(key, member))
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool> {
        Ok(self.keyspace.lock().await.set_remove(key, member))
    }

    async fn set_is_member(&self, key: &str, member: &str) -> AppResult<bool> {
        Ok(self.keyspace.lock().await.set_is_member(key, member))
    }

    async fn set_pop(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.keyspace.lock().await.set_pop(key))
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        Ok(self.keyspace.lock().await.set_members(key))
    }

    async fn set_card(&self, key: &str) -> AppResult<u64> {
        Ok(self.keyspace.lock().await.set_card(key))
    }

    async fn hash_get(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        Ok(self.keyspace.lock().await.hash_get(key, field))
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> AppResult<()> {
        self.keyspace.lock().await.hash_set(key, field, value);
        Ok(())
    }

    async fn hash_set_many(&self, key: &str, fields: &[(String, String)]) -> AppResult<()> {
        let mut keyspace = self.keyspace.lock().await;
        for (field, value) in fields {
            keyspace.hash_set(key, field, value);
        }
        Ok(())
    }

    async fn hash_delete(&self, key: &str, field: &str) -> AppResult<bool> {
        Ok(self.keyspace.lock().await.hash_delete(key, field))
    }

    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>> {
        Ok(self.keyspace.lock().await.hash_get_all(key))
    }

    async fn list_push(&self, key: &str, value: &str) -> AppResult<u64> {
        Ok(self.keyspace.lock().await.list_push(key, value))
    }

    async fn list_remove(&self, key: &str, value: &str) -> AppResult<u64> {
        Ok(self.keyspace.lock().await.list_remove(key, value))
    }

    async fn list_index(&self, key: &str, index: i64) -> AppResult<Option<String>> {
        Ok(self.keyspace.lock().await.list_index(key, index))
    }

    async fn list_position(&self, key: &str, value: &str) -> AppResult<Option<u64>> {
        Ok(self.keyspace.lock().await.list_position(key, value))
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> AppResult<Vec<String>> {
        Ok(self.keyspace.lock().await.list_range(key, start, stop))
    }

    async fn publish(&self, channel: &str, payload: &str) -> AppResult<u64> {
        let receivers = self.pubsub.publish(channel, payload);
        debug!(channel, receivers, "Published message");
        Ok(receivers)
    }

    async fn subscribe(&self, channel: &str) -> AppResult<MessageStream> {
        debug!(channel, "Subscribing to channel");
        Ok(self.pubsub.subscribe(channel))
    }

    async fn reset(&self) -> AppResult<()> {
        self.keyspace.lock().await.clear();
        info!("In-memory store reset");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn init_counter(&self) -> AppResult<()> {
        self.keyspace.lock().await.init_counter();
        Ok(())
    }

    async fn next_room_id(&self) -> AppResult<RoomId> {
        Ok(self.keyspace.lock().await.next_room_id())
    }

    async fn populate_key_pool(&self, candidates: &[RoomKey]) -> AppResult<u64> {
        Ok(self.keyspace.lock().await.populate_key_pool(candidates))
    }

    async fn claim_key_for_room(&self, room_id: RoomId) -> AppResult<Option<RoomKey>> {
        Ok(self.keyspace.lock().await.claim_key_for_room(room_id))
    }

    async fn release_key(&self, room_id: RoomId, key: &RoomKey) -> AppResult<ReleaseOutcome> {
        self.keyspace.lock().await.release_key(room_id, key)
    }
}
