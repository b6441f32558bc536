//! Event relay configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Settings for membership event publishing and relaying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Store pub/sub channel carrying room events.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Buffer size of each per-room local broadcast channel.
    #[serde(default = "default_room_buffer_size")]
    pub room_buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            room_buffer_size: default_room_buffer_size(),
        }
    }
}

impl RelayConfig {
    /// Validate relay settings.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.channel.is_empty() {
            return Err(AppError::configuration("relay.channel must not be empty"));
        }
        if self.room_buffer_size == 0 {
            return Err(AppError::configuration(
                "relay.room_buffer_size must be positive",
            ));
        }
        Ok(())
    }
}

fn default_channel() -> String {
    "roomEvents".to_string()
}

fn default_room_buffer_size() -> usize {
    64
}
