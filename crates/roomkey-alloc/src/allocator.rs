//! Room-id generator and room key pool.

use std::sync::Arc;

use tracing::{debug, info, warn};

use roomkey_core::config::rooms::RoomsConfig;
use roomkey_core::error::AppError;
use roomkey_core::result::AppResult;
use roomkey_core::traits::{ReleaseOutcome, StoreProvider};
use roomkey_core::types::{RoomId, RoomKey};
use roomkey_store::keys;

use crate::keygen::KeyGenerator;

/// Snapshot of the key pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    /// Keys currently unused and claimable.
    pub unused: u64,
    /// Keys generated into the pool by `init`.
    pub configured_size: usize,
}

/// Hands out room ids and room keys.
///
/// Holds no allocation state of its own: the counter and the pool are read
/// and written only through the store's atomic procedures, never cached
/// in-process.
#[derive(Debug, Clone)]
pub struct RoomAllocator {
    /// Backing store.
    store: Arc<dyn StoreProvider>,
    /// Candidate key source.
    generator: KeyGenerator,
    /// Keys generated by `init`.
    pool_size: usize,
    /// Generation rounds before `generate_key_pool` gives up.
    max_rounds: u32,
}

impl RoomAllocator {
    /// Creates an allocator over `store` using the room settings.
    pub fn new(store: Arc<dyn StoreProvider>, config: &RoomsConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            generator: KeyGenerator::from_config(config)?,
            pool_size: config.key_pool_size,
            max_rounds: config.max_generation_rounds,
        })
    }

    /// Destructively resets the store, zeroes the room counter and fills
    /// the key pool with the configured number of keys.
    ///
    /// Returns the number of keys generated.
    pub async fn init(&self) -> AppResult<u64> {
        self.store.reset().await?;
        self.store.init_counter().await?;
        let generated = self.generate_key_pool(self.pool_size).await?;
        info!(pool_size = generated, "Room allocator initialized");
        Ok(generated)
    }

    /// Returns a room id never handed out before in this store epoch.
    pub async fn next_room_id(&self) -> AppResult<RoomId> {
        let id = self.store.next_room_id().await?;
        debug!(room_id = %id, "Generated room id");
        Ok(id)
    }

    /// Adds `count` freshly generated keys to the unused pool.
    ///
    /// Candidates that collide with an unused or bound key are discarded and
    /// replaced in the next round. Fails with `Conflict` if the pool cannot
    /// be grown by `count` within the configured number of rounds.
    pub async fn generate_key_pool(&self, count: usize) -> AppResult<u64> {
        let mut remaining = count;
        let mut rounds = 0;

        while remaining > 0 {
            if rounds == self.max_rounds {
                warn!(
                    requested = count,
                    missing = remaining,
                    "Key pool generation ran out of rounds"
                );
                return Err(AppError::conflict(format!(
                    "Could only generate {} of {count} unique room keys",
                    count - remaining
                )));
            }
            rounds += 1;

            let candidates = self.generator.generate_batch(remaining);
            let added = self.store.populate_key_pool(&candidates).await? as usize;
            if added < candidates.len() {
                debug!(
                    discarded = candidates.len() - added,
                    "Discarded colliding key candidates"
                );
            }
            remaining = remaining.saturating_sub(added);
        }

        info!(count, rounds, "Key pool populated");
        Ok(count as u64)
    }

    /// Removes and returns one arbitrary unused key without binding it.
    ///
    /// Callers must follow up with [`bind_key_to_room`](Self::bind_key_to_room);
    /// a failure in between leaks the key. Prefer
    /// [`claim_key_for_room`](Self::claim_key_for_room).
    pub async fn claim_key(&self) -> AppResult<RoomKey> {
        match self.store.set_pop(keys::ROOM_KEYS).await? {
            Some(key) => {
                debug!(key = %key, "Claimed room key");
                Ok(RoomKey(key))
            }
            None => {
                warn!("Room key claim failed: pool exhausted");
                Err(AppError::exhausted("Run out of keys"))
            }
        }
    }

    /// Puts `key` back into the unused pool.
    ///
    /// The caller must already have removed the key's binding.
    pub async fn return_key(&self, key: &RoomKey) -> AppResult<()> {
        self.store.set_add(keys::ROOM_KEYS, key.as_str()).await?;
        debug!(key = %key, "Returned room key to pool");
        Ok(())
    }

    /// Writes both directions of the key/room binding as two separate writes.
    pub async fn bind_key_to_room(&self, room_id: RoomId, key: &RoomKey) -> AppResult<()> {
        let room = room_id.to_string();
        self.store
            .hash_set(keys::ROOM_ID_FOR_KEY, key.as_str(), &room)
            .await?;
        self.store
            .hash_set(keys::KEY_FOR_ROOM_ID, &room, key.as_str())
            .await?;
        debug!(room_id = %room_id, key = %key, "Bound room key");
        Ok(())
    }

    /// Returns the key bound to `room_id`, claiming an unused key and binding
    /// it in one atomic step if the room has none.
    pub async fn claim_key_for_room(&self, room_id: RoomId) -> AppResult<RoomKey> {
        match self.store.claim_key_for_room(room_id).await? {
            Some(key) => {
                info!(room_id = %room_id, key = %key, "Room key issued");
                Ok(key)
            }
            None => {
                warn!(room_id = %room_id, "Room key claim failed: pool exhausted");
                Err(AppError::exhausted("Run out of keys"))
            }
        }
    }

    /// Resolves a claimed key to the room it is bound to.
    pub async fn resolve_key(&self, key: &RoomKey) -> AppResult<RoomId> {
        let bound = self
            .store
            .hash_get(keys::ROOM_ID_FOR_KEY, key.as_str())
            .await?
            .ok_or_else(|| AppError::not_found(format!("No room is bound to key '{key}'")))?;

        bound.parse::<RoomId>().map_err(|_| {
            AppError::internal(format!("Key '{key}' is bound to malformed room id '{bound}'"))
        })
    }

    /// Returns the key currently bound to `room_id`, if any.
    pub async fn key_for_room(&self, room_id: RoomId) -> AppResult<Option<RoomKey>> {
        let key = self
            .store
            .hash_get(keys::KEY_FOR_ROOM_ID, &room_id.to_string())
            .await?;
        Ok(key.map(RoomKey))
    }

    /// Removes the binding of `key` and returns it to the pool.
    ///
    /// Fails with `NotFound` if the key is unbound and with `Mismatch` if it
    /// is bound to a different room, in which case the binding is untouched.
    pub async fn release_and_return_key(&self, room_id: RoomId, key: &RoomKey) -> AppResult<()> {
        match self.store.release_key(room_id, key).await? {
            ReleaseOutcome::Released => {
                info!(room_id = %room_id, key = %key, "Room key returned");
                Ok(())
            }
            ReleaseOutcome::NotFound => Err(AppError::not_found(format!(
                "No room is bound to key '{key}'"
            ))),
            ReleaseOutcome::Mismatch { bound_to } => {
                warn!(
                    room_id = %room_id,
                    bound_to = %bound_to,
                    key = %key,
                    "Room key release rejected: room mismatch"
                );
                Err(AppError::mismatch(format!(
                    "roomID {room_id} and roomID for key '{key}' ({bound_to}) do not match"
                )))
            }
        }
    }

    /// Current pool occupancy.
    pub async fn pool_state(&self) -> AppResult<PoolState> {
        let unused = self.store.set_card(keys::ROOM_KEYS).await?;
        Ok(PoolState {
            unused,
            configured_size: self.pool_size,
        })
    }
}
