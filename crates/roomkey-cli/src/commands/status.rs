//! Store health and pool status.

use serde::Serialize;

use crate::output::{self, OutputFormat};
use roomkey_core::error::AppError;
use roomkey_core::traits::StoreProvider;
use roomkey_service::RoomRegistry;

/// Status summary
#[derive(Debug, Serialize)]
struct Status {
    provider: String,
    healthy: bool,
    unused_keys: u64,
    configured_pool_size: usize,
    public_rooms: usize,
}

/// Show store health, key pool, and public room counts
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::connect_store(&config).await?;
    let healthy = store.health_check().await?;
    let registry = RoomRegistry::new(store, &config)?;

    let pool = registry.allocator().pool_state().await?;
    let status = Status {
        provider: config.store.provider.clone(),
        healthy,
        unused_keys: pool.unused,
        configured_pool_size: pool.configured_size,
        public_rooms: registry.public().public_rooms().await?.len(),
    };

    if !healthy {
        output::print_warning("Store health check failed");
    }
    output::print_item(&status, format);
    Ok(())
}
