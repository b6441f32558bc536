//! Random room key generation.

use std::collections::HashSet;

use rand::Rng;

use roomkey_core::config::rooms::{MIN_KEY_LENGTH, RoomsConfig};
use roomkey_core::error::AppError;
use roomkey_core::types::RoomKey;

/// Draws allowed per requested key before a batch is returned short.
const BATCH_DRAW_FACTOR: usize = 8;

/// Generates short random keys from a fixed alphabet.
///
/// With the default 62-character alphabet and length 6 there are
/// 62^6 (about 5.7e10) keys, so collisions within a pool of practical
/// size are negligible; the store still rejects any that occur.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    /// Characters keys are drawn from.
    alphabet: Vec<char>,
    /// Number of characters per key.
    length: usize,
}

impl KeyGenerator {
    /// Creates a generator, validating the alphabet and length.
    pub fn new(alphabet: &str, length: usize) -> Result<Self, AppError> {
        let mut chars: Vec<char> = alphabet.chars().collect();
        chars.sort_unstable();
        chars.dedup();

        if chars.len() < 2 {
            return Err(AppError::validation(
                "Key alphabet must contain at least two distinct characters",
            ));
        }
        if length < MIN_KEY_LENGTH {
            return Err(AppError::validation(format!(
                "Key length must be at least {MIN_KEY_LENGTH}"
            )));
        }

        Ok(Self {
            alphabet: chars,
            length,
        })
    }

    /// Creates a generator from room settings.
    pub fn from_config(config: &RoomsConfig) -> Result<Self, AppError> {
        Self::new(&config.key_alphabet, config.key_length)
    }

    /// Generates one key.
    pub fn generate(&self) -> RoomKey {
        let mut rng = rand::thread_rng();
        let key: String = (0..self.length)
            .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
            .collect();
        RoomKey(key)
    }

    /// Generates up to `count` keys, de-duplicated within the batch.
    ///
    /// Returns fewer than `count` only when the key space is too small to
    /// produce that many distinct keys in a bounded number of draws.
    pub fn generate_batch(&self, count: usize) -> Vec<RoomKey> {
        let mut seen = HashSet::with_capacity(count);
        let mut keys = Vec::with_capacity(count);
        let max_draws = count.saturating_mul(BATCH_DRAW_FACTOR).max(count);
        for _ in 0..max_draws {
            if keys.len() == count {
                break;
            }
            let key = self.generate();
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
        keys
    }

    /// Key length in characters.
    pub fn length(&self) -> usize {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_use_alphabet() {
        let generator = KeyGenerator::new("ab", 8).unwrap();
        let key = generator.generate();
        assert_eq!(key.as_str().len(), 8);
        assert!(key.as_str().chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn test_batch_is_distinct() {
        let generator = KeyGenerator::from_config(&RoomsConfig::default()).unwrap();
        let mut batch = generator.generate_batch(200);
        batch.sort();
        batch.dedup();
        assert_eq!(batch.len(), 200);
    }

    #[test]
    fn test_batch_stops_when_key_space_is_small() {
        // Only 2^6 = 64 distinct keys exist.
        let generator = KeyGenerator::new("ab", 6).unwrap();
        let batch = generator.generate_batch(100);
        assert!(batch.len() <= 64);
    }

    #[test]
    fn test_rejects_short_length() {
        assert!(KeyGenerator::new("abcdef", 3).is_err());
    }

    #[test]
    fn test_rejects_single_character_alphabet() {
        assert!(KeyGenerator::new("aaaa", 6).is_err());
    }
}
