//! Lua scripts backing the atomic procedures.
//!
//! Redis runs each script to completion before serving any other command,
//! so every script below is one indivisible unit. Key names arrive through
//! `KEYS` (already prefixed) so the scripts stay prefix-agnostic.

use redis::Script;

/// Read the room counter (missing = 0), store counter + 1, return the old value.
///
/// KEYS[1] = counter
pub const NEXT_ROOM_ID: &str = r#"
    local id = tonumber(redis.call('GET', KEYS[1]) or '0')
    redis.call('SET', KEYS[1], id + 1)
    return id
"#;

/// Add candidate keys to the unused pool, skipping keys that are bound.
///
/// KEYS[1] = unused pool set
/// KEYS[2] = key -> room hash
/// ARGV    = candidate keys
///
/// Returns the number of keys actually added.
pub const POPULATE_KEY_POOL: &str = r#"
    local added = 0
    for _, candidate in ipairs(ARGV) do
        if redis.call('HEXISTS', KEYS[2], candidate) == 0 then
            added = added + redis.call('SADD', KEYS[1], candidate)
        end
    end
    return added
"#;

/// Return the room's key, popping an unused key and binding it in both
/// directions if the room has none yet.
///
/// KEYS[1] = unused pool set
/// KEYS[2] = key -> room hash
/// KEYS[3] = room -> key hash
/// ARGV[1] = room id
///
/// Returns the key, or nil when the room has no key and the pool is empty.
pub const CLAIM_KEY_FOR_ROOM: &str = r#"
    redis.replicate_commands()
    local existing = redis.call('HGET', KEYS[3], ARGV[1])
    if existing then
        return existing
    end
    local key = redis.call('SPOP', KEYS[1])
    if not key then
        return false
    end
    redis.call('HSET', KEYS[2], key, ARGV[1])
    redis.call('HSET', KEYS[3], ARGV[1], key)
    return key
"#;

/// Unbind a key from its room and return it to the pool.
///
/// KEYS[1] = unused pool set
/// KEYS[2] = key -> room hash
/// KEYS[3] = room -> key hash
/// ARGV[1] = room id
/// ARGV[2] = key
///
/// Returns `{status, bound_room}`:
///   0 = key not bound
///   1 = released (the room -> key entry is removed only if it names this key)
///   2 = bound to another room (bound_room holds it), nothing changed
pub const RELEASE_KEY: &str = r#"
    local bound = redis.call('HGET', KEYS[2], ARGV[2])
    if not bound then
        return {0, ''}
    end
    if bound ~= ARGV[1] then
        return {2, bound}
    end
    redis.call('HDEL', KEYS[2], ARGV[2])
    if redis.call('HGET', KEYS[3], ARGV[1]) == ARGV[2] then
        redis.call('HDEL', KEYS[3], ARGV[1])
    end
    redis.call('SADD', KEYS[1], ARGV[2])
    return {1, ''}
"#;

/// Status codes returned by [`RELEASE_KEY`].
pub const RELEASE_NOT_FOUND: i64 = 0;
/// Released successfully.
pub const RELEASE_OK: i64 = 1;
/// Bound to another room.
pub const RELEASE_MISMATCH: i64 = 2;

/// Pre-hashed scripts, built once per provider.
#[derive(Debug, Clone)]
pub struct Scripts {
    /// See [`NEXT_ROOM_ID`].
    pub next_room_id: Script,
    /// See [`POPULATE_KEY_POOL`].
    pub populate_key_pool: Script,
    /// See [`CLAIM_KEY_FOR_ROOM`].
    pub claim_key_for_room: Script,
    /// See [`RELEASE_KEY`].
    pub release_key: Script,
}

impl Scripts {
    /// Hash every script.
    pub fn new() -> Self {
        Self {
            next_room_id: Script::new(NEXT_ROOM_ID),
            populate_key_pool: Script::new(POPULATE_KEY_POOL),
            claim_key_for_room: Script::new(CLAIM_KEY_FOR_ROOM),
            release_key: Script::new(RELEASE_KEY),
        }
    }
}

impl Default for Scripts {
    fn default() -> Self {
        Self::new()
    }
}
