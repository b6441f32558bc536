//! Store provider trait for pluggable key-value backends.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::result::AppResult;
use crate::types::id::{RoomId, RoomKey};

/// Stream of raw payloads received on a subscribed channel.
pub type MessageStream = BoxStream<'static, String>;

/// Result of the atomic release procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Both binding directions were removed and the key is back in the pool.
    Released,
    /// The key had no binding.
    NotFound,
    /// The key is bound to a different room; nothing was changed.
    Mismatch {
        /// The room the key is actually bound to.
        bound_to: RoomId,
    },
}

/// Trait for key-value store backends (Redis or in-memory).
///
/// Keys passed in are logical names (see `roomkey_store::keys`); the
/// provider is responsible for any prefixing. The atomic procedures at the
/// bottom each execute as one indivisible unit on the store and are the
/// only way the room counter and the key pool are mutated.
#[async_trait]
pub trait StoreProvider: Send + Sync + std::fmt::Debug + 'static {
    // ── Sets ───────────────────────────────────────────────

    /// Add a member to a set. Returns `true` if it was not already present.
    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Remove a member from a set. Returns `true` if it was present.
    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Check set membership.
    async fn set_is_member(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Remove and return an arbitrary member, or `None` for an empty set.
    async fn set_pop(&self, key: &str) -> AppResult<Option<String>>;

    /// All members of a set, in no particular order.
    async fn set_members(&self, key: &str) -> AppResult<Vec<String>>;

    /// Number of members in a set.
    async fn set_card(&self, key: &str) -> AppResult<u64>;

    // ── Hashes ─────────────────────────────────────────────

    /// Get one hash field.
    async fn hash_get(&self, key: &str, field: &str) -> AppResult<Option<String>>;

    /// Set one hash field.
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> AppResult<()>;

    /// Set several hash fields in one call.
    async fn hash_set_many(&self, key: &str, fields: &[(String, String)]) -> AppResult<()>;

    /// Delete one hash field. Returns `true` if it existed.
    async fn hash_delete(&self, key: &str, field: &str) -> AppResult<bool>;

    /// All fields of a hash; empty when the hash does not exist.
    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>>;

    // ── Lists ──────────────────────────────────────────────

    /// Append to the tail of a list. Returns the new length.
    async fn list_push(&self, key: &str, value: &str) -> AppResult<u64>;

    /// Remove every occurrence of a value. Returns how many were removed.
    async fn list_remove(&self, key: &str, value: &str) -> AppResult<u64>;

    /// Element at `index`; negative indexes count from the tail.
    async fn list_index(&self, key: &str, index: i64) -> AppResult<Option<String>>;

    /// Position of the first occurrence of a value.
    async fn list_position(&self, key: &str, value: &str) -> AppResult<Option<u64>>;

    /// Elements between `start` and `stop` inclusive, Redis `LRANGE` semantics.
    async fn list_range(&self, key: &str, start: i64, stop: i64) -> AppResult<Vec<String>>;

    // ── Pub/sub ────────────────────────────────────────────

    /// Publish a payload. Returns the number of receivers it reached.
    async fn publish(&self, channel: &str, payload: &str) -> AppResult<u64>;

    /// Subscribe to a channel.
    async fn subscribe(&self, channel: &str) -> AppResult<MessageStream>;

    // ── Administration ─────────────────────────────────────

    /// Destructively remove every key owned by this store.
    async fn reset(&self) -> AppResult<()>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    // ── Atomic procedures ──────────────────────────────────

    /// Set the room counter to zero.
    async fn init_counter(&self) -> AppResult<()>;

    /// Return the current room counter and store counter + 1.
    ///
    /// A missing counter is read as zero.
    async fn next_room_id(&self) -> AppResult<RoomId>;

    /// Add candidate keys to the unused pool, skipping any candidate that is
    /// already unused or currently bound to a room. Returns how many were added.
    async fn populate_key_pool(&self, candidates: &[RoomKey]) -> AppResult<u64>;

    /// Return the key bound to `room_id`, or pop one unused key and bind it
    /// in both directions if the room has none.
    ///
    /// Returns `None` when the room has no key and the pool is empty.
    async fn claim_key_for_room(&self, room_id: RoomId) -> AppResult<Option<RoomKey>>;

    /// Remove the binding of `key` if it belongs to `room_id` and return the
    /// key to the unused pool. The room -> key entry is cleared only if it
    /// names `key`.
    ///
    /// A stored binding that is not a room id is an `Internal` error.
    async fn release_key(&self, room_id: RoomId, key: &RoomKey) -> AppResult<ReleaseOutcome>;
}
