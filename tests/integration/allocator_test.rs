//! Integration tests for the room-id generator and the key pool.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use roomkey_core::types::{RoomId, RoomKey};

#[tokio::test]
async fn test_concurrent_room_ids_are_unique_and_dense() {
    let rooms = helpers::TestRooms::new().await;
    let allocator = rooms.allocator();

    let tasks = (0..100).map(|_| {
        let allocator = Arc::clone(&allocator);
        tokio::spawn(async move { allocator.next_room_id().await })
    });

    let ids: HashSet<u64> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked").expect("next_room_id failed").get())
        .collect();

    assert_eq!(ids, (0..100).collect::<HashSet<u64>>());
}

#[tokio::test]
async fn test_concurrent_claims_never_share_a_key() {
    let rooms = helpers::TestRooms::with_pool_size(5).await;
    let allocator = rooms.allocator();

    let tasks = (0..8).map(|i| {
        let allocator = Arc::clone(&allocator);
        tokio::spawn(async move { allocator.claim_key_for_room(RoomId(i)).await })
    });

    let mut issued = HashSet::new();
    let mut exhausted = 0;
    for result in join_all(tasks).await {
        match result.expect("task panicked") {
            Ok(key) => assert!(issued.insert(key), "key issued twice"),
            Err(e) => {
                assert!(e.is_exhausted(), "unexpected error: {e}");
                exhausted += 1;
            }
        }
    }

    assert_eq!(issued.len(), 5);
    assert_eq!(exhausted, 3);
    assert_eq!(rooms.unused_keys().await, 0);
    assert_eq!(rooms.bound_keys().await, 5);
}

#[tokio::test]
async fn test_pool_conservation_across_claim_and_release() {
    let rooms = helpers::TestRooms::with_pool_size(5).await;
    let allocator = rooms.allocator();

    let mut held: Vec<(RoomId, RoomKey)> = Vec::new();
    for i in 0..3 {
        let room = RoomId(i);
        held.push((room, allocator.claim_key_for_room(room).await.unwrap()));
        assert_eq!(rooms.unused_keys().await + rooms.bound_keys().await as u64, 5);
    }

    for (room, key) in held {
        allocator.release_and_return_key(room, &key).await.unwrap();
        assert_eq!(rooms.unused_keys().await + rooms.bound_keys().await as u64, 5);
    }

    assert_eq!(rooms.unused_keys().await, 5);
    assert_eq!(rooms.bound_keys().await, 0);
}

#[tokio::test]
async fn test_binding_consistency_and_mismatch_rejection() {
    let rooms = helpers::TestRooms::new().await;
    let allocator = rooms.allocator();

    let key = allocator.claim_key().await.unwrap();
    allocator.bind_key_to_room(RoomId(1), &key).await.unwrap();
    assert_eq!(allocator.resolve_key(&key).await.unwrap(), RoomId(1));

    let err = allocator
        .release_and_return_key(RoomId(2), &key)
        .await
        .unwrap_err();
    assert!(err.is_mismatch());
    assert_eq!(allocator.resolve_key(&key).await.unwrap(), RoomId(1));

    allocator.release_and_return_key(RoomId(1), &key).await.unwrap();
    assert!(allocator.resolve_key(&key).await.unwrap_err().is_not_found());

    let err = allocator
        .release_and_return_key(RoomId(1), &key)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_init_claim_exhaust_release_scenario() {
    let rooms = helpers::TestRooms::with_pool_size(5).await;
    let allocator = rooms.allocator();

    assert_eq!(allocator.next_room_id().await.unwrap(), RoomId(0));
    assert_eq!(allocator.next_room_id().await.unwrap(), RoomId(1));

    let mut claimed = Vec::new();
    for i in 0..5 {
        let key = allocator.claim_key().await.unwrap();
        allocator.bind_key_to_room(RoomId(i), &key).await.unwrap();
        claimed.push(key);
    }
    let distinct: HashSet<&RoomKey> = claimed.iter().collect();
    assert_eq!(distinct.len(), 5);

    assert!(allocator.claim_key().await.unwrap_err().is_exhausted());

    allocator
        .release_and_return_key(RoomId(2), &claimed[2])
        .await
        .unwrap();
    let again = allocator.claim_key().await.unwrap();
    assert_eq!(again, claimed[2]);
}

#[tokio::test]
async fn test_generated_keys_match_configured_shape() {
    let rooms = helpers::TestRooms::new().await;
    let allocator = rooms.allocator();
    let alphabet = &rooms.config.rooms.key_alphabet;

    for _ in 0..5 {
        let key = allocator.claim_key().await.unwrap();
        assert_eq!(key.as_str().chars().count(), rooms.config.rooms.key_length);
        assert!(key.as_str().chars().all(|c| alphabet.contains(c)));
    }
}
