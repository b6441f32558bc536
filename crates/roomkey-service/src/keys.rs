//! Room key issuance and lookup.

use std::sync::Arc;

use roomkey_alloc::RoomAllocator;
use roomkey_core::result::AppResult;
use roomkey_core::traits::StoreProvider;
use roomkey_core::types::{RoomId, RoomKey};

use crate::membership::ensure_room_exists;

/// Hands out shareable keys for existing rooms.
#[derive(Debug, Clone)]
pub struct RoomKeyService {
    store: Arc<dyn StoreProvider>,
    allocator: Arc<RoomAllocator>,
}

impl RoomKeyService {
    /// Creates a new key service.
    pub fn new(store: Arc<dyn StoreProvider>, allocator: Arc<RoomAllocator>) -> Self {
        Self { store, allocator }
    }

    /// Returns the room's key, claiming one from the pool if it has none.
    ///
    /// Fails with `NotFound` if the room has no members and with
    /// `Exhausted` if the pool is empty.
    pub async fn get_key(&self, room_id: RoomId) -> AppResult<RoomKey> {
        ensure_room_exists(self.store.as_ref(), room_id).await?;
        self.allocator.claim_key_for_room(room_id).await
    }

    /// Unbinds `key` from the room and puts it back in the pool.
    pub async fn return_key(&self, room_id: RoomId, key: &RoomKey) -> AppResult<()> {
        self.allocator.release_and_return_key(room_id, key).await
    }

    /// Room bound to `key`; `NotFound` if the key is not in use.
    pub async fn room_for_key(&self, key: &RoomKey) -> AppResult<RoomId> {
        self.allocator.resolve_key(key).await
    }

    /// Key bound to the room, if any.
    pub async fn key_for_room(&self, room_id: RoomId) -> AppResult<Option<RoomKey>> {
        self.allocator.key_for_room(room_id).await
    }
}

#[cfg(test)]
mod tests {
    use roomkey_core::config::rooms::RoomsConfig;
    use roomkey_store::keys;
    use roomkey_store::memory::MemoryStoreProvider;

    use super::*;

    async fn setup(pool_size: usize) -> (RoomKeyService, Arc<dyn StoreProvider>) {
        let store: Arc<dyn StoreProvider> = Arc::new(MemoryStoreProvider::default());
        let config = RoomsConfig {
            key_pool_size: pool_size,
            ..RoomsConfig::default()
        };
        let allocator = Arc::new(RoomAllocator::new(Arc::clone(&store), &config).unwrap());
        allocator.init().await.unwrap();
        (RoomKeyService::new(Arc::clone(&store), allocator), store)
    }

    async fn add_member(store: &Arc<dyn StoreProvider>, room_id: RoomId) {
        store
            .set_add(&keys::room_users(room_id), "member")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_key_binds_both_directions() {
        let (service, store) = setup(5).await;
        add_member(&store, RoomId(1)).await;

        let key = service.get_key(RoomId(1)).await.unwrap();
        assert_eq!(service.room_for_key(&key).await.unwrap(), RoomId(1));
        assert_eq!(service.key_for_room(RoomId(1)).await.unwrap(), Some(key));
    }

    #[tokio::test]
    async fn test_get_key_is_stable_per_room() {
        let (service, store) = setup(5).await;
        add_member(&store, RoomId(1)).await;

        let first = service.get_key(RoomId(1)).await.unwrap();
        let second = service.get_key(RoomId(1)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.set_card(keys::ROOM_KEYS).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_concurrent_get_key_issues_one_key() {
        let (service, store) = setup(5).await;
        add_member(&store, RoomId(0)).await;
        let service = Arc::new(service);

        let tasks = (0..8).map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.get_key(RoomId(0)).await })
        });
        let issued: std::collections::HashSet<RoomKey> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();

        assert_eq!(issued.len(), 1);
        assert_eq!(store.set_card(keys::ROOM_KEYS).await.unwrap(), 4);
        assert_eq!(store.hash_get_all(keys::ROOM_ID_FOR_KEY).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_key_requires_room() {
        let (service, _) = setup(5).await;
        let err = service.get_key(RoomId(7)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_key_exhausted() {
        let (service, store) = setup(1).await;
        add_member(&store, RoomId(1)).await;
        add_member(&store, RoomId(2)).await;

        service.get_key(RoomId(1)).await.unwrap();
        let err = service.get_key(RoomId(2)).await.unwrap_err();
        assert!(err.is_exhausted());
    }

    #[tokio::test]
    async fn test_return_key_restores_pool() {
        let (service, store) = setup(2).await;
        add_member(&store, RoomId(1)).await;

        let key = service.get_key(RoomId(1)).await.unwrap();
        service.return_key(RoomId(1), &key).await.unwrap();

        assert_eq!(store.set_card(keys::ROOM_KEYS).await.unwrap(), 2);
        assert!(service.room_for_key(&key).await.unwrap_err().is_not_found());
        assert_eq!(service.key_for_room(RoomId(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_return_key_for_wrong_room() {
        let (service, store) = setup(2).await;
        add_member(&store, RoomId(1)).await;

        let key = service.get_key(RoomId(1)).await.unwrap();
        let err = service.return_key(RoomId(2), &key).await.unwrap_err();
        assert!(err.is_mismatch());
        assert_eq!(service.room_for_key(&key).await.unwrap(), RoomId(1));
    }
}
