//! Room id and key pool configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Shortest key length accepted; shorter keys collide too easily.
pub const MIN_KEY_LENGTH: usize = 6;

/// Settings for the room-id counter and the room key pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomsConfig {
    /// Number of keys generated into the pool at initialization.
    #[serde(default = "default_key_pool_size")]
    pub key_pool_size: usize,
    /// Length of each generated key.
    #[serde(default = "default_key_length")]
    pub key_length: usize,
    /// Characters keys are drawn from.
    #[serde(default = "default_key_alphabet")]
    pub key_alphabet: String,
    /// How many rounds of candidate generation to attempt before giving up
    /// on filling the pool.
    #[serde(default = "default_max_generation_rounds")]
    pub max_generation_rounds: u32,
    /// Whether the server wipes the store and repopulates the pool on start.
    #[serde(default = "default_true")]
    pub reset_on_start: bool,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            key_pool_size: default_key_pool_size(),
            key_length: default_key_length(),
            key_alphabet: default_key_alphabet(),
            max_generation_rounds: default_max_generation_rounds(),
            reset_on_start: default_true(),
        }
    }
}

impl RoomsConfig {
    /// Validate pool and key settings.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.key_pool_size == 0 {
            return Err(AppError::configuration("rooms.key_pool_size must be positive"));
        }
        if self.key_length < MIN_KEY_LENGTH {
            return Err(AppError::configuration(format!(
                "rooms.key_length must be at least {MIN_KEY_LENGTH}"
            )));
        }
        if self.key_alphabet.chars().count() < 2 {
            return Err(AppError::configuration(
                "rooms.key_alphabet must contain at least two characters",
            ));
        }
        if self.max_generation_rounds == 0 {
            return Err(AppError::configuration(
                "rooms.max_generation_rounds must be positive",
            ));
        }
        Ok(())
    }
}

fn default_key_pool_size() -> usize {
    5
}

fn default_key_length() -> usize {
    MIN_KEY_LENGTH
}

fn default_key_alphabet() -> String {
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
}

fn default_max_generation_rounds() -> u32 {
    16
}

fn default_true() -> bool {
    true
}
