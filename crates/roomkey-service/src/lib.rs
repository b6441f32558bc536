//! # roomkey-service
//!
//! The room registry. Each service translates room lifecycle calls into
//! store primitives; only key issuance goes through the allocator's atomic
//! procedures. Multi-step flows (join, leave, metadata updates) are not
//! transactional and may interleave with other callers.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod data;
pub mod keys;
pub mod membership;
pub mod public;
pub mod registry;

pub use data::RoomDataService;
pub use keys::RoomKeyService;
pub use membership::MembershipService;
pub use public::PublicRoomService;
pub use registry::RoomRegistry;
