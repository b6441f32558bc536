//! Integration tests for the event relay.

mod helpers;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use helpers::user;
use roomkey_core::events::{RoomAction, RoomEvent};
use roomkey_core::types::RoomId;
use roomkey_realtime::EventRelay;

#[tokio::test]
async fn test_relay_routes_events_to_room_observers() {
    let rooms = helpers::TestRooms::new().await;
    let relay = EventRelay::new(Arc::clone(&rooms.store), &rooms.config.relay);

    let seen_room_one: Arc<Mutex<Vec<RoomEvent>>> = Arc::default();
    let seen_all: Arc<Mutex<Vec<RoomEvent>>> = Arc::default();
    {
        let seen = Arc::clone(&seen_room_one);
        relay.on_room(
            RoomId(1),
            Arc::new(move |event: &RoomEvent| seen.lock().unwrap().push(event.clone())),
        );
    }
    {
        let seen = Arc::clone(&seen_all);
        relay.on_all(Arc::new(move |event: &RoomEvent| {
            seen.lock().unwrap().push(event.clone())
        }));
    }
    let mut room_one_rx = relay.subscribe_room(RoomId(1));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = relay.start(shutdown_rx).await.unwrap();

    let membership = rooms.registry.membership();
    let r0 = membership.create_room(&user("a")).await.unwrap();
    let r1 = membership.create_room(&user("b")).await.unwrap();
    assert_eq!((r0, r1), (RoomId(0), RoomId(1)));
    membership.leave_room(&user("b"), r1).await.unwrap();

    let first = tokio::time::timeout(Duration::from_secs(2), room_one_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.action, RoomAction::Join);
    let second = tokio::time::timeout(Duration::from_secs(2), room_one_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.action, RoomAction::Leave);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();

    let room_one = seen_room_one.lock().unwrap();
    assert_eq!(room_one.len(), 2);
    assert!(room_one.iter().all(|e| e.room_id == RoomId(1)));
    assert_eq!(seen_all.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_removed_observer_stops_receiving() {
    let rooms = helpers::TestRooms::new().await;
    let relay = EventRelay::new(Arc::clone(&rooms.store), &rooms.config.relay);

    let count = Arc::new(Mutex::new(0usize));
    let id = {
        let count = Arc::clone(&count);
        relay.on_all(Arc::new(move |_: &RoomEvent| *count.lock().unwrap() += 1))
    };
    let mut probe = relay.subscribe_room(RoomId(0));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = relay.start(shutdown_rx).await.unwrap();

    let membership = rooms.registry.membership();
    let room = membership.create_room(&user("a")).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), probe.recv())
        .await
        .unwrap()
        .unwrap();

    assert!(relay.remove_observer(id));
    membership.join_room(&user("b"), room).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), probe.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(*count.lock().unwrap(), 1);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}
