//! Publicly discoverable rooms, kept as an ordered list of room ids.

use std::sync::Arc;

use tracing::{debug, warn};

use roomkey_core::result::AppResult;
use roomkey_core::traits::StoreProvider;
use roomkey_core::types::RoomId;
use roomkey_store::keys;

/// Maintains the public room listing.
#[derive(Debug, Clone)]
pub struct PublicRoomService {
    store: Arc<dyn StoreProvider>,
}

impl PublicRoomService {
    /// Creates a new public room service.
    pub fn new(store: Arc<dyn StoreProvider>) -> Self {
        Self { store }
    }

    /// Lists the room publicly. Returns `false` if it was already listed.
    pub async fn make_public(&self, room_id: RoomId) -> AppResult<bool> {
        if self.is_public(room_id).await? {
            return Ok(false);
        }
        self.store
            .list_push(keys::PUBLIC_ROOMS, &room_id.to_string())
            .await?;
        debug!(room_id = %room_id, "Room made public");
        Ok(true)
    }

    /// Removes the room from the listing. Returns `false` if it was not listed.
    pub async fn make_private(&self, room_id: RoomId) -> AppResult<bool> {
        let removed = self
            .store
            .list_remove(keys::PUBLIC_ROOMS, &room_id.to_string())
            .await?;
        if removed > 0 {
            debug!(room_id = %room_id, "Room made private");
        }
        Ok(removed > 0)
    }

    /// Whether the room is listed.
    pub async fn is_public(&self, room_id: RoomId) -> AppResult<bool> {
        Ok(self
            .store
            .list_position(keys::PUBLIC_ROOMS, &room_id.to_string())
            .await?
            .is_some())
    }

    /// All listed rooms in listing order.
    pub async fn public_rooms(&self) -> AppResult<Vec<RoomId>> {
        let raw = self.store.list_range(keys::PUBLIC_ROOMS, 0, -1).await?;
        Ok(raw.iter().filter_map(|value| parse_room_id(value)).collect())
    }

    /// Listed room at `index`; negative indexes count from the end.
    pub async fn public_room_at(&self, index: i64) -> AppResult<Option<RoomId>> {
        let raw = self.store.list_index(keys::PUBLIC_ROOMS, index).await?;
        Ok(raw.as_deref().and_then(parse_room_id))
    }
}

fn parse_room_id(value: &str) -> Option<RoomId> {
    match value.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(value, "Skipping malformed public room entry");
            None
        }
    }
}
