//! In-memory store provider for single-node deployments and tests.

pub mod keyspace;
pub mod pubsub;
pub mod store;

pub use store::MemoryStoreProvider;
