//! # roomkey-alloc
//!
//! Room-id generation and room key allocation.
//!
//! Both pieces of shared mutable state (the room counter and the unused
//! key pool) live in the store and are only ever changed through the
//! store's atomic procedures, so any number of processes can allocate
//! concurrently without client-side locking.

pub mod allocator;
pub mod keygen;

pub use allocator::{PoolState, RoomAllocator};
pub use keygen::KeyGenerator;
