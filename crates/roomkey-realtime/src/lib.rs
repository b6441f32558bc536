//! # roomkey-realtime
//!
//! Membership event plumbing for RoomKey:
//!
//! - [`EventPublisher`] encodes room events and publishes them on the
//!   shared store channel
//! - [`EventRelay`] subscribes to that channel and re-emits each event to
//!   observers registered for the event's room
//!
//! Observers are registered per room topic and know nothing about the
//! transport subscription or the allocator.

pub mod codec;
pub mod observer;
pub mod publisher;
pub mod relay;

pub use observer::{ObserverId, ObserverRegistry, RoomEventHandler, Topic};
pub use publisher::EventPublisher;
pub use relay::EventRelay;
