//! Core traits defined in `roomkey-core` and implemented by other crates.

pub mod store;

pub use store::{MessageStream, ReleaseOutcome, StoreProvider};
