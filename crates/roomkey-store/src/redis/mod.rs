//! Redis store provider.

pub mod client;
pub mod operations;
pub mod scripts;

pub use client::{RedisClient, mask_redis_url};
pub use operations::RedisStoreProvider;
