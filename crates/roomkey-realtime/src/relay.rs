//! Store channel → local observers relay.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use roomkey_core::config::relay::RelayConfig;
use roomkey_core::events::RoomEvent;
use roomkey_core::result::AppResult;
use roomkey_core::traits::{MessageStream, StoreProvider};
use roomkey_core::types::RoomId;

use crate::codec;
use crate::observer::{ObserverId, ObserverRegistry, RoomEventHandler, Topic};

/// Subscribes to the shared room event channel and re-emits each event to
/// the observers registered for its room.
#[derive(Debug, Clone)]
pub struct EventRelay {
    /// Store used as the pub/sub transport.
    store: Arc<dyn StoreProvider>,
    /// Channel name.
    channel: String,
    /// Registered observers.
    observers: Arc<ObserverRegistry>,
}

impl EventRelay {
    /// Creates a relay from configuration.
    pub fn new(store: Arc<dyn StoreProvider>, config: &RelayConfig) -> Self {
        Self {
            store,
            channel: config.channel.clone(),
            observers: Arc::new(ObserverRegistry::new(config.room_buffer_size)),
        }
    }

    /// Registers a handler for one room's events.
    pub fn on_room(&self, room_id: RoomId, handler: Arc<dyn RoomEventHandler>) -> ObserverId {
        self.observers.register(Topic::Room(room_id), handler)
    }

    /// Registers a handler for every room's events.
    pub fn on_all(&self, handler: Arc<dyn RoomEventHandler>) -> ObserverId {
        self.observers.register(Topic::AllRooms, handler)
    }

    /// Removes a handler.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    /// Local broadcast receiver for one room's events.
    pub fn subscribe_room(&self, room_id: RoomId) -> broadcast::Receiver<RoomEvent> {
        self.observers.subscribe_room(room_id)
    }

    /// The observer registry.
    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Subscribes to the channel and spawns the relay loop.
    ///
    /// The subscription is established before this returns, so events
    /// published afterwards are guaranteed to be relayed. The task ends when
    /// `shutdown` becomes `true` or the subscription closes.
    pub async fn start(&self, shutdown: watch::Receiver<bool>) -> AppResult<JoinHandle<()>> {
        let stream = self.store.subscribe(&self.channel).await?;
        info!(channel = %self.channel, "Event relay started");

        let relay = self.clone();
        Ok(tokio::spawn(async move {
            relay.run(stream, shutdown).await;
        }))
    }

    async fn run(&self, mut stream: MessageStream, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(channel = %self.channel, "Event relay shutting down");
                        break;
                    }
                }
                payload = stream.next() => {
                    match payload {
                        Some(payload) => self.relay_payload(&payload),
                        None => {
                            warn!(channel = %self.channel, "Event subscription closed");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Decodes one payload and dispatches it. Malformed payloads are dropped.
    pub fn relay_payload(&self, payload: &str) {
        match codec::decode_event(payload) {
            Ok(event) => {
                let handlers = self.observers.dispatch(&event);
                debug!(
                    room_id = %event.room_id,
                    action = %event.action,
                    handlers,
                    "Room event relayed"
                );
            }
            Err(e) => {
                warn!(error = %e, payload, "Dropping malformed room event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use roomkey_core::types::UserId;
    use roomkey_store::memory::MemoryStoreProvider;

    use super::*;

    #[test]
    fn test_malformed_payload_is_dropped() {
        let store: Arc<dyn StoreProvider> = Arc::new(MemoryStoreProvider::default());
        let relay = EventRelay::new(store, &RelayConfig::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        relay.on_all(Arc::new(move |_: &RoomEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        relay.relay_payload("not json");
        relay.relay_payload(r#"{"roomID": 1, "action": "join", "user": "a", "users": ["a"]}"#);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_relay_stops_on_shutdown() {
        let store: Arc<dyn StoreProvider> = Arc::new(MemoryStoreProvider::default());
        let relay = EventRelay::new(Arc::clone(&store), &RelayConfig::default());
        let mut room = relay.subscribe_room(RoomId(2));

        let (tx, rx) = watch::channel(false);
        let handle = relay.start(rx).await.unwrap();

        let event = RoomEvent::join(RoomId(2), UserId::from("a"), vec![UserId::from("a")]);
        let payload = codec::encode_event(&event).unwrap();
        assert_eq!(store.publish("roomEvents", &payload).await.unwrap(), 1);
        assert_eq!(room.recv().await.unwrap(), event);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
