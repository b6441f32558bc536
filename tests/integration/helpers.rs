//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use roomkey_alloc::RoomAllocator;
use roomkey_core::config::AppConfig;
use roomkey_core::events::RoomEvent;
use roomkey_core::traits::{MessageStream, StoreProvider};
use roomkey_core::types::UserId;
use roomkey_service::RoomRegistry;
use roomkey_store::StoreManager;
use roomkey_store::keys;

/// Test room context backed by a fresh store
pub struct TestRooms {
    /// Shared store
    pub store: Arc<dyn StoreProvider>,
    /// Room registry wired to `store`
    pub registry: RoomRegistry,
    /// Configuration used to build the registry
    pub config: AppConfig,
}

impl TestRooms {
    /// Create an initialized in-memory context with the default pool size
    pub async fn new() -> Self {
        Self::with_pool_size(AppConfig::default().rooms.key_pool_size).await
    }

    /// Create an initialized in-memory context with `pool_size` keys
    pub async fn with_pool_size(pool_size: usize) -> Self {
        let mut config = AppConfig::default();
        config.rooms.key_pool_size = pool_size;
        let store: Arc<dyn StoreProvider> = Arc::new(StoreManager::in_memory());
        Self::with_store(store, config).await
    }

    /// Create an initialized context on an existing store
    pub async fn with_store(store: Arc<dyn StoreProvider>, config: AppConfig) -> Self {
        let registry =
            RoomRegistry::new(Arc::clone(&store), &config).expect("Failed to build registry");
        registry.init().await.expect("Failed to init registry");
        Self {
            store,
            registry,
            config,
        }
    }

    /// A standalone allocator sharing this context's store
    pub fn allocator(&self) -> Arc<RoomAllocator> {
        Arc::new(
            RoomAllocator::new(Arc::clone(&self.store), &self.config.rooms)
                .expect("Failed to build allocator"),
        )
    }

    /// Number of unused keys in the pool
    pub async fn unused_keys(&self) -> u64 {
        self.store
            .set_card(keys::ROOM_KEYS)
            .await
            .expect("Failed to read pool")
    }

    /// Number of keys currently bound to a room
    pub async fn bound_keys(&self) -> usize {
        self.store
            .hash_get_all(keys::ROOM_ID_FOR_KEY)
            .await
            .expect("Failed to read bindings")
            .len()
    }
}

/// Build a user id
pub fn user(name: &str) -> UserId {
    UserId::from(name)
}

/// Wait for the next payload on `stream` and decode it as a room event
pub async fn next_event(stream: &mut MessageStream) -> RoomEvent {
    let payload = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("Timed out waiting for room event")
        .expect("Event stream ended");
    serde_json::from_str(&payload).expect("Malformed room event")
}
