//! Integration tests against a live Redis server.
//!
//! Ignored by default. Run with
//! `ROOMKEY_TEST_REDIS_URL=redis://127.0.0.1:6379 cargo test --test redis_test -- --ignored`.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use helpers::user;
use roomkey_core::config::AppConfig;
use roomkey_core::events::RoomAction;
use roomkey_core::traits::StoreProvider;
use roomkey_core::types::{RoomId, RoomKey};
use roomkey_store::StoreManager;

/// Connect to the test server under a prefix unique to `test_name`
async fn redis_rooms(test_name: &str, pool_size: usize) -> helpers::TestRooms {
    let mut config = AppConfig::default();
    config.store.provider = "redis".to_string();
    config.store.redis.url = std::env::var("ROOMKEY_TEST_REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    config.store.redis.key_prefix = format!("roomkey-test:{}:{}:", std::process::id(), test_name);
    config.rooms.key_pool_size = pool_size;

    let store: Arc<dyn StoreProvider> = Arc::new(
        StoreManager::new(&config.store)
            .await
            .expect("Failed to connect to test Redis"),
    );
    helpers::TestRooms::with_store(store, config).await
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_concurrent_room_ids() {
    let rooms = redis_rooms("ids", 5).await;
    let allocator = rooms.allocator();

    let tasks = (0..50).map(|_| {
        let allocator = Arc::clone(&allocator);
        tokio::spawn(async move { allocator.next_room_id().await })
    });
    let ids: HashSet<u64> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked").expect("next_room_id failed").get())
        .collect();

    assert_eq!(ids, (0..50).collect::<HashSet<u64>>());
    rooms.store.reset().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_claim_exhaust_release() {
    let rooms = redis_rooms("pool", 3).await;
    let allocator = rooms.allocator();
    assert_eq!(rooms.unused_keys().await, 3);

    let tasks = (0..5).map(|i| {
        let allocator = Arc::clone(&allocator);
        tokio::spawn(async move { allocator.claim_key_for_room(RoomId(i)).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked"))
        .collect();

    let issued: Vec<&RoomKey> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(issued.len(), 3);
    assert_eq!(issued.iter().collect::<HashSet<_>>().len(), 3);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_exhausted()))
            .count(),
        2
    );

    let key = issued[0].clone();
    let room = allocator.resolve_key(&key).await.unwrap();
    let wrong_room = RoomId(room.get() + 100);
    assert!(
        allocator
            .release_and_return_key(wrong_room, &key)
            .await
            .unwrap_err()
            .is_mismatch()
    );
    allocator.release_and_return_key(room, &key).await.unwrap();
    assert!(allocator.resolve_key(&key).await.unwrap_err().is_not_found());
    assert_eq!(rooms.unused_keys().await, 1);

    rooms.store.reset().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_membership_events() {
    let rooms = redis_rooms("events", 5).await;
    let mut events = rooms
        .store
        .subscribe(&rooms.config.relay.channel)
        .await
        .unwrap();

    let membership = rooms.registry.membership();
    let room = membership.create_room(&user("a")).await.unwrap();
    membership.leave_room(&user("a"), room).await.unwrap();

    let join = helpers::next_event(&mut events).await;
    assert_eq!((join.room_id, join.action), (room, RoomAction::Join));
    let leave = helpers::next_event(&mut events).await;
    assert_eq!((leave.room_id, leave.action), (room, RoomAction::Leave));
    assert!(leave.users.is_empty());

    rooms.store.reset().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_reset_only_touches_prefix() {
    let ours = redis_rooms("reset-a", 2).await;
    let theirs = redis_rooms("reset-b", 2).await;

    ours.store.reset().await.unwrap();
    assert_eq!(ours.unused_keys().await, 0);
    assert_eq!(theirs.unused_keys().await, 2);

    theirs.store.reset().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_concurrent_get_key_binds_once() {
    let rooms = redis_rooms("get-key", 5).await;
    let room = rooms
        .registry
        .membership()
        .create_room(&user("host"))
        .await
        .unwrap();
    let registry = Arc::new(rooms.registry.clone());

    let tasks = (0..10).map(|_| {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.keys().get_key(room).await })
    });
    let issued: HashSet<RoomKey> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked").expect("get_key failed"))
        .collect();

    assert_eq!(issued.len(), 1);
    assert_eq!(rooms.unused_keys().await, 4);
    assert_eq!(rooms.bound_keys().await, 1);

    rooms.store.reset().await.unwrap();
}
