//! Core type definitions used across the RoomKey workspace.

pub mod id;

pub use id::*;
