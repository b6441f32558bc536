//! JSON encoding of room events on the wire.

use roomkey_core::events::RoomEvent;
use roomkey_core::result::AppResult;

/// Serialize a room event to its wire JSON.
pub fn encode_event(event: &RoomEvent) -> AppResult<String> {
    Ok(serde_json::to_string(event)?)
}

/// Deserialize a room event from wire JSON.
pub fn decode_event(payload: &str) -> AppResult<RoomEvent> {
    Ok(serde_json::from_str(payload)?)
}
