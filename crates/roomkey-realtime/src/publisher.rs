//! Publishes room events on the shared store channel.

use std::sync::Arc;

use tracing::debug;

use roomkey_core::events::RoomEvent;
use roomkey_core::result::AppResult;
use roomkey_core::traits::StoreProvider;

use crate::codec;

/// Encodes and publishes room membership events.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    /// Store used as the pub/sub transport.
    store: Arc<dyn StoreProvider>,
    /// Channel name.
    channel: String,
}

impl EventPublisher {
    /// Creates a publisher on `channel`.
    pub fn new(store: Arc<dyn StoreProvider>, channel: impl Into<String>) -> Self {
        Self {
            store,
            channel: channel.into(),
        }
    }

    /// Publishes one event, returning how many subscribers received it.
    pub async fn publish(&self, event: &RoomEvent) -> AppResult<u64> {
        let payload = codec::encode_event(event)?;
        let receivers = self.store.publish(&self.channel, &payload).await?;
        debug!(
            room_id = %event.room_id,
            action = %event.action,
            user = %event.user,
            receivers,
            "Room event published"
        );
        Ok(receivers)
    }

    /// The channel events are published on.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}
