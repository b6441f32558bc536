//! Observer registry — room topic → registered handlers.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::broadcast;

use roomkey_core::events::RoomEvent;
use roomkey_core::types::RoomId;

/// Topic an observer listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Events of a single room.
    Room(RoomId),
    /// Events of every room.
    AllRooms,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Room(id) => write!(f, "room:{id}"),
            Topic::AllRooms => write!(f, "room:*"),
        }
    }
}

/// Handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Receives room events.
///
/// Handlers run on the relay task and should return quickly; spawn work
/// that needs to await.
pub trait RoomEventHandler: Send + Sync {
    /// Called once per event on the handler's topic.
    fn handle(&self, event: &RoomEvent);
}

impl<F> RoomEventHandler for F
where
    F: Fn(&RoomEvent) + Send + Sync,
{
    fn handle(&self, event: &RoomEvent) {
        self(event)
    }
}

type HandlerEntry = (ObserverId, Arc<dyn RoomEventHandler>);

/// Registry of room event observers and per-room local broadcast channels.
pub struct ObserverRegistry {
    /// Topic → handlers.
    handlers: DashMap<Topic, Vec<HandlerEntry>>,
    /// Observer → topic (reverse index for removal).
    topics: DashMap<ObserverId, Topic>,
    /// Room → local broadcast sender.
    channels: DashMap<RoomId, broadcast::Sender<RoomEvent>>,
    /// Next observer id.
    next_id: AtomicU64,
    /// Buffer size of each local broadcast channel.
    buffer_size: usize,
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("topics", &self.handlers.len())
            .field("observers", &self.topics.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl ObserverRegistry {
    /// Creates an empty registry.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            handlers: DashMap::new(),
            topics: DashMap::new(),
            channels: DashMap::new(),
            next_id: AtomicU64::new(1),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Registers `handler` on `topic`.
    pub fn register(&self, topic: Topic, handler: Arc<dyn RoomEventHandler>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.entry(topic).or_default().push((id, handler));
        self.topics.insert(id, topic);
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let Some((_, topic)) = self.topics.remove(&id) else {
            return false;
        };
        if let Some(mut entries) = self.handlers.get_mut(&topic) {
            entries.retain(|(entry_id, _)| *entry_id != id);
            if entries.is_empty() {
                drop(entries);
                self.handlers.remove_if(&topic, |_, entries| entries.is_empty());
            }
        }
        true
    }

    /// Local broadcast receiver for one room's events.
    pub fn subscribe_room(&self, room_id: RoomId) -> broadcast::Receiver<RoomEvent> {
        self.channels
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .subscribe()
    }

    /// Delivers `event` to its room's observers, the wildcard observers and
    /// any local subscribers. Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &RoomEvent) -> usize {
        // Snapshot handlers so none runs while a map shard is locked.
        let mut targets: Vec<Arc<dyn RoomEventHandler>> = Vec::new();
        for topic in [Topic::Room(event.room_id), Topic::AllRooms] {
            if let Some(entries) = self.handlers.get(&topic) {
                targets.extend(entries.iter().map(|(_, handler)| Arc::clone(handler)));
            }
        }

        for handler in &targets {
            handler.handle(event);
        }

        let mut closed = false;
        if let Some(tx) = self.channels.get(&event.room_id) {
            closed = tx.send(event.clone()).is_err();
        }
        if closed {
            self.channels
                .remove_if(&event.room_id, |_, tx| tx.receiver_count() == 0);
        }

        targets.len()
    }

    /// Number of observers registered on `topic`.
    pub fn observer_count(&self, topic: Topic) -> usize {
        self.handlers.get(&topic).map_or(0, |entries| entries.len())
    }
}
