//! Integration tests for room membership, keys, metadata, and listings.

mod helpers;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;

use helpers::user;
use roomkey_core::events::RoomAction;
use roomkey_core::types::RoomId;

#[tokio::test]
async fn test_create_rooms_get_sequential_ids() {
    let rooms = helpers::TestRooms::new().await;
    let membership = rooms.registry.membership();

    assert_eq!(membership.create_room(&user("a")).await.unwrap(), RoomId(0));
    assert_eq!(membership.create_room(&user("b")).await.unwrap(), RoomId(1));
    assert_eq!(membership.create_room(&user("a")).await.unwrap(), RoomId(2));
}

#[tokio::test]
async fn test_concurrent_joins_all_land() {
    let rooms = helpers::TestRooms::new().await;
    let registry = Arc::new(rooms.registry.clone());
    let room = registry.membership().create_room(&user("host")).await.unwrap();

    let tasks = (0..20).map(|i| {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            registry
                .membership()
                .join_room(&user(&format!("guest-{i}")), room)
                .await
        })
    });
    for result in join_all(tasks).await {
        result.expect("task panicked").expect("join failed");
    }

    assert_eq!(registry.membership().user_count(room).await.unwrap(), 21);
}

#[tokio::test]
async fn test_membership_events_carry_member_list() {
    let rooms = helpers::TestRooms::new().await;
    let mut events = rooms
        .store
        .subscribe(&rooms.config.relay.channel)
        .await
        .unwrap();
    let membership = rooms.registry.membership();

    let room = membership.create_room(&user("a")).await.unwrap();
    membership.join_room(&user("b"), room).await.unwrap();
    membership.leave_room(&user("a"), room).await.unwrap();

    let first = helpers::next_event(&mut events).await;
    assert_eq!(first.action, RoomAction::Join);
    assert_eq!(first.users, vec![user("a")]);

    let second = helpers::next_event(&mut events).await;
    assert_eq!(second.user, user("b"));
    assert_eq!(second.users, vec![user("a"), user("b")]);

    let third = helpers::next_event(&mut events).await;
    assert_eq!(third.room_id, room);
    assert_eq!(third.action, RoomAction::Leave);
    assert_eq!(third.users, vec![user("b")]);
}

#[tokio::test]
async fn test_key_lifecycle_through_registry() {
    let rooms = helpers::TestRooms::with_pool_size(2).await;
    let registry = &rooms.registry;

    let first = registry.membership().create_room(&user("a")).await.unwrap();
    let second = registry.membership().create_room(&user("b")).await.unwrap();
    let third = registry.membership().create_room(&user("c")).await.unwrap();

    let k1 = registry.keys().get_key(first).await.unwrap();
    let k2 = registry.keys().get_key(second).await.unwrap();
    assert_ne!(k1, k2);
    assert!(registry.keys().get_key(third).await.unwrap_err().is_exhausted());

    registry.keys().return_key(first, &k1).await.unwrap();
    let k3 = registry.keys().get_key(third).await.unwrap();
    assert_eq!(k3, k1);
    assert_eq!(registry.keys().room_for_key(&k3).await.unwrap(), third);
}

#[tokio::test]
async fn test_concurrent_get_key_on_one_room() {
    let rooms = helpers::TestRooms::with_pool_size(5).await;
    let registry = Arc::new(rooms.registry.clone());
    let room = registry.membership().create_room(&user("host")).await.unwrap();

    let tasks = (0..16).map(|_| {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.keys().get_key(room).await })
    });
    let keys: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked").expect("get_key failed"))
        .collect();

    assert!(keys.iter().all(|k| *k == keys[0]));
    assert_eq!(rooms.unused_keys().await, 4);
    assert_eq!(rooms.bound_keys().await, 1);

    registry.keys().return_key(room, &keys[0]).await.unwrap();
    assert_eq!(registry.keys().key_for_room(room).await.unwrap(), None);
    assert_eq!(rooms.unused_keys().await, 5);
}

#[tokio::test]
async fn test_leaving_keeps_key_bound() {
    let rooms = helpers::TestRooms::new().await;
    let registry = &rooms.registry;

    let room = registry.membership().create_room(&user("solo")).await.unwrap();
    let key = registry.keys().get_key(room).await.unwrap();
    registry.membership().leave_room(&user("solo"), room).await.unwrap();

    assert_eq!(registry.keys().room_for_key(&key).await.unwrap(), room);
    assert!(registry.keys().get_key(room).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_room_data_round_trip() {
    let rooms = helpers::TestRooms::new().await;
    let registry = &rooms.registry;
    let room = registry.membership().create_room(&user("a")).await.unwrap();

    registry
        .data()
        .set_room_data(
            room,
            HashMap::from([("game".to_string(), "chess".to_string())]),
        )
        .await
        .unwrap();
    registry
        .data()
        .set_room_data_var(room, "turn", "white")
        .await
        .unwrap();

    let all = registry.data().get_room_data(room).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(
        registry.data().del_room_data_var(room, "turn").await.unwrap(),
        Some("white".to_string())
    );
    assert_eq!(registry.data().get_room_data(room).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_public_listing_tracks_visibility() {
    let rooms = helpers::TestRooms::new().await;
    let public = rooms.registry.public();

    for id in [3, 1, 2] {
        public.make_public(RoomId(id)).await.unwrap();
    }
    public.make_public(RoomId(1)).await.unwrap();
    public.make_private(RoomId(3)).await.unwrap();

    assert_eq!(
        public.public_rooms().await.unwrap(),
        vec![RoomId(1), RoomId(2)]
    );
    assert_eq!(public.public_room_at(0).await.unwrap(), Some(RoomId(1)));
}
