//! Store key builders for every RoomKey entry.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses. Names are logical; the Redis
//! provider adds its configured prefix.

use roomkey_core::types::RoomId;

// ── Allocator keys ─────────────────────────────────────────

/// Counter holding the next room id to hand out.
pub const NEXT_ROOM_ID: &str = "nextRoomID";

/// Set of unused room keys.
pub const ROOM_KEYS: &str = "roomKeys";

/// Hash mapping a claimed key to its room id.
pub const ROOM_ID_FOR_KEY: &str = "roomIDForKey";

/// Hash mapping a room id to its claimed key.
pub const KEY_FOR_ROOM_ID: &str = "keyForRoomID";

// ── Room keys ──────────────────────────────────────────────

/// List of publicly discoverable room ids.
pub const PUBLIC_ROOMS: &str = "publicRooms";

/// Set of users in a room.
pub fn room_users(room_id: RoomId) -> String {
    format!("roomUsers:{room_id}")
}

/// Hash of arbitrary metadata for a room.
pub fn room_data(room_id: RoomId) -> String {
    format!("roomData:{room_id}")
}
