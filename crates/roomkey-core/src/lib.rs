//! # roomkey-core
//!
//! Core crate for RoomKey. Contains the store adapter trait, configuration
//! schemas, typed identifiers, room membership events, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other RoomKey crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
