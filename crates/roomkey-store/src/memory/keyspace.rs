//! Plain data structures behind the in-memory store.
//!
//! Every method is synchronous; the provider calls them while holding its
//! mutex, which is what makes the multi-key procedures atomic.

use std::collections::{HashMap, HashSet};

use roomkey_core::error::AppError;
use roomkey_core::result::AppResult;
use roomkey_core::traits::ReleaseOutcome;
use roomkey_core::types::{RoomId, RoomKey};

use crate::keys;

/// All keys of the in-memory store, grouped by value type.
///
/// Empty sets, hashes and lists are removed, matching Redis, so "missing"
/// and "empty" are indistinguishable.
#[derive(Debug, Default)]
pub struct Keyspace {
    counters: HashMap<String, u64>,
    sets: HashMap<String, HashSet<String>>,
    hashes: HashMap<String, HashMap<String, String>>,
    lists: HashMap<String, Vec<String>>,
}

impl Keyspace {
    /// Create an empty keyspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every key.
    pub fn clear(&mut self) {
        self.counters.clear();
        self.sets.clear();
        self.hashes.clear();
        self.lists.clear();
    }

    // ── Sets ───────────────────────────────────────────────

    pub fn set_add(&mut self, key: &str, member: &str) -> bool {
        self.sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string())
    }

    pub fn set_remove(&mut self, key: &str, member: &str) -> bool {
        let Some(set) = self.sets.get_mut(key) else {
            return false;
        };
        let removed = set.remove(member);
        if set.is_empty() {
            self.sets.remove(key);
        }
        removed
    }

    pub fn set_is_member(&self, key: &str, member: &str) -> bool {
        self.sets.get(key).is_some_and(|set| set.contains(member))
    }

    pub fn set_pop(&mut self, key: &str) -> Option<String> {
        let set = self.sets.get_mut(key)?;
        let member = set.iter().next().cloned()?;
        set.remove(&member);
        if set.is_empty() {
            self.sets.remove(key);
        }
        Some(member)
    }

    pub fn set_members(&self, key: &str) -> Vec<String> {
        self.sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn set_card(&self, key: &str) -> u64 {
        self.sets.get(key).map_or(0, |set| set.len() as u64)
    }

    // ── Hashes ─────────────────────────────────────────────

    pub fn hash_get(&self, key: &str, field: &str) -> Option<String> {
        self.hashes.get(key).and_then(|hash| hash.get(field).cloned())
    }

    pub fn hash_set(&mut self, key: &str, field: &str, value: &str) {
        self.hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    pub fn hash_delete(&mut self, key: &str, field: &str) -> bool {
        let Some(hash) = self.hashes.get_mut(key) else {
            return false;
        };
        let removed = hash.remove(field).is_some();
        if hash.is_empty() {
            self.hashes.remove(key);
        }
        removed
    }

    pub fn hash_get_all(&self, key: &str) -> HashMap<String, String> {
        self.hashes.get(key).cloned().unwrap_or_default()
    }

    // ── Lists ──────────────────────────────────────────────

    pub fn list_push(&mut self, key: &str, value: &str) -> u64 {
        let list = self.lists.entry(key.to_string()).or_default();
        list.push(value.to_string());
        list.len() as u64
    }

    pub fn list_remove(&mut self, key: &str, value: &str) -> u64 {
        let Some(list) = self.lists.get_mut(key) else {
            return 0;
        };
        let before = list.len();
        list.retain(|item| item != value);
        let removed = (before - list.len()) as u64;
        if list.is_empty() {
            self.lists.remove(key);
        }
        removed
    }

    pub fn list_index(&self, key: &str, index: i64) -> Option<String> {
        let list = self.lists.get(key)?;
        let idx = normalize_index(index, list.len())?;
        list.get(idx).cloned()
    }

    pub fn list_position(&self, key: &str, value: &str) -> Option<u64> {
        self.lists
            .get(key)?
            .iter()
            .position(|item| item == value)
            .map(|pos| pos as u64)
    }

    pub fn list_range(&self, key: &str, start: i64, stop: i64) -> Vec<String> {
        let Some(list) = self.lists.get(key) else {
            return Vec::new();
        };
        let len = list.len() as i64;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Vec::new();
        }
        list[start as usize..=stop as usize].to_vec()
    }

    // ── Atomic procedures ──────────────────────────────────

    pub fn init_counter(&mut self) {
        self.counters.insert(keys::NEXT_ROOM_ID.to_string(), 0);
    }

    pub fn next_room_id(&mut self) -> RoomId {
        let counter = self
            .counters
            .entry(keys::NEXT_ROOM_ID.to_string())
            .or_insert(0);
        let id = *counter;
        *counter += 1;
        RoomId(id)
    }

    pub fn populate_key_pool(&mut self, candidates: &[RoomKey]) -> u64 {
        let mut added = 0;
        for key in candidates {
            if self.hash_get(keys::ROOM_ID_FOR_KEY, key.as_str()).is_some() {
                continue;
            }
            if self.set_add(keys::ROOM_KEYS, key.as_str()) {
                added += 1;
            }
        }
        added
    }

    /// Returns the room's key, claiming one from the pool if it has none.
    pub fn claim_key_for_room(&mut self, room_id: RoomId) -> Option<RoomKey> {
        let room = room_id.to_string();
        if let Some(existing) = self.hash_get(keys::KEY_FOR_ROOM_ID, &room) {
            return Some(RoomKey(existing));
        }
        let key = self.set_pop(keys::ROOM_KEYS)?;
        self.hash_set(keys::ROOM_ID_FOR_KEY, &key, &room);
        self.hash_set(keys::KEY_FOR_ROOM_ID, &room, &key);
        Some(RoomKey(key))
    }

    /// Unbinds `key` from `room_id` and returns it to the pool.
    ///
    /// The room -> key entry is removed only if it still names `key`.
    pub fn release_key(&mut self, room_id: RoomId, key: &RoomKey) -> AppResult<ReleaseOutcome> {
        let room = room_id.to_string();
        let Some(bound) = self.hash_get(keys::ROOM_ID_FOR_KEY, key.as_str()) else {
            return Ok(ReleaseOutcome::NotFound);
        };
        if bound != room {
            let bound_to = bound.parse::<RoomId>().map_err(|_| {
                AppError::internal(format!("Key '{key}' is bound to malformed room '{bound}'"))
            })?;
            return Ok(ReleaseOutcome::Mismatch { bound_to });
        }

        self.hash_delete(keys::ROOM_ID_FOR_KEY, key.as_str());
        if self.hash_get(keys::KEY_FOR_ROOM_ID, &room).as_deref() == Some(key.as_str()) {
            self.hash_delete(keys::KEY_FOR_ROOM_ID, &room);
        }
        self.set_add(keys::ROOM_KEYS, key.as_str());
        Ok(ReleaseOutcome::Released)
    }
}

/// Convert a possibly negative Redis-style index into a vector index.
fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if index < 0 { len + index } else { index };
    (0..len).contains(&idx).then_some(idx as usize)
}
