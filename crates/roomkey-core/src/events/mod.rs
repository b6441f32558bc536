//! Room membership events.
//!
//! Events are published on the shared store channel by the room registry
//! and re-emitted locally by the event relay. The JSON shape is
//! `{"roomID": 3, "action": "join", "user": "u1", "users": ["u1"]}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::id::{RoomId, UserId};

/// What happened to a room's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomAction {
    /// A user joined the room.
    Join,
    /// A user left the room.
    Leave,
}

impl RoomAction {
    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
        }
    }
}

impl fmt::Display for RoomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A membership change in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEvent {
    /// The room whose membership changed.
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
    /// Join or leave.
    pub action: RoomAction,
    /// The user who joined or left.
    pub user: UserId,
    /// Room members after the change.
    #[serde(default)]
    pub users: Vec<UserId>,
}

impl RoomEvent {
    /// Build a join event.
    pub fn join(room_id: RoomId, user: UserId, users: Vec<UserId>) -> Self {
        Self {
            room_id,
            action: RoomAction::Join,
            user,
            users,
        }
    }

    /// Build a leave event.
    pub fn leave(room_id: RoomId, user: UserId, users: Vec<UserId>) -> Self {
        Self {
            room_id,
            action: RoomAction::Leave,
            user,
            users,
        }
    }
}
