//! Per-room metadata stored as a flat string hash.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use roomkey_core::result::AppResult;
use roomkey_core::traits::StoreProvider;
use roomkey_core::types::RoomId;
use roomkey_store::keys;

use crate::membership::ensure_room_exists;

/// Reads and writes room metadata fields.
#[derive(Debug, Clone)]
pub struct RoomDataService {
    store: Arc<dyn StoreProvider>,
}

impl RoomDataService {
    /// Creates a new metadata service.
    pub fn new(store: Arc<dyn StoreProvider>) -> Self {
        Self { store }
    }

    /// Sets one field and returns the stored value.
    pub async fn set_room_data_var(
        &self,
        room_id: RoomId,
        field: &str,
        value: &str,
    ) -> AppResult<String> {
        ensure_room_exists(self.store.as_ref(), room_id).await?;
        self.store
            .hash_set(&keys::room_data(room_id), field, value)
            .await?;
        debug!(room_id = %room_id, field, "Room data set");
        Ok(value.to_string())
    }

    /// Reads one field.
    pub async fn get_room_data_var(&self, room_id: RoomId, field: &str) -> AppResult<Option<String>> {
        ensure_room_exists(self.store.as_ref(), room_id).await?;
        self.store.hash_get(&keys::room_data(room_id), field).await
    }

    /// Deletes one field and returns its previous value.
    ///
    /// If the delete itself fails after the value was read, the failure is
    /// logged and the previous value is still returned.
    pub async fn del_room_data_var(&self, room_id: RoomId, field: &str) -> AppResult<Option<String>> {
        ensure_room_exists(self.store.as_ref(), room_id).await?;

        let key = keys::room_data(room_id);
        let previous = self.store.hash_get(&key, field).await?;

        if let Err(e) = self.store.hash_delete(&key, field).await {
            warn!(room_id = %room_id, field, error = %e, "Failed to delete room data field");
        }

        Ok(previous)
    }

    /// All metadata of the room; empty when none was set.
    pub async fn get_room_data(&self, room_id: RoomId) -> AppResult<HashMap<String, String>> {
        ensure_room_exists(self.store.as_ref(), room_id).await?;
        self.store.hash_get_all(&keys::room_data(room_id)).await
    }

    /// Writes every field of `data` in one call and returns `data`.
    ///
    /// Existing fields not present in `data` are kept. The room is not
    /// checked for members.
    pub async fn set_room_data(
        &self,
        room_id: RoomId,
        data: HashMap<String, String>,
    ) -> AppResult<HashMap<String, String>> {
        if data.is_empty() {
            return Ok(data);
        }

        let fields: Vec<(String, String)> = data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.store
            .hash_set_many(&keys::room_data(room_id), &fields)
            .await?;
        debug!(room_id = %room_id, fields = fields.len(), "Room data replaced");
        Ok(data)
    }
}
