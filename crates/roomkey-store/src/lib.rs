//! # roomkey-store
//!
//! Store provider implementations for RoomKey. Supports two modes:
//!
//! - **memory**: single-process store guarded by one async mutex
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis)
//!   crate, with Lua scripts for the atomic procedures
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::StoreManager;
