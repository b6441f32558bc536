//! RoomKey Server: room membership and room key distribution
//!
//! Main entry point that wires the store, the room registry, and the event
//! relay together and runs until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use roomkey_core::config::AppConfig;
use roomkey_core::error::AppError;
use roomkey_core::events::RoomEvent;
use roomkey_core::traits::StoreProvider;
use roomkey_realtime::EventRelay;
use roomkey_service::RoomRegistry;
use roomkey_store::StoreManager;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("ROOMKEY_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RoomKey v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Store ────────────────────────────────────────────
    let store: Arc<dyn StoreProvider> = Arc::new(StoreManager::new(&config.store).await?);
    if !store.health_check().await? {
        return Err(AppError::store("Store health check failed"));
    }
    tracing::info!(provider = %config.store.provider, "Store connected");

    // ── Step 2: Room registry ────────────────────────────────────
    let registry = RoomRegistry::new(Arc::clone(&store), &config)?;
    if config.rooms.reset_on_start {
        tracing::warn!("Resetting store on start; existing rooms and keys are discarded");
        registry.init().await?;
    } else {
        let pool = registry.allocator().pool_state().await?;
        tracing::info!(unused_keys = pool.unused, "Keeping existing store state");
    }

    // ── Step 3: Event relay ──────────────────────────────────────
    let relay = EventRelay::new(Arc::clone(&store), &config.relay);
    relay.on_all(Arc::new(|event: &RoomEvent| {
        tracing::info!(
            room_id = %event.room_id,
            action = %event.action,
            user = %event.user,
            members = event.users.len(),
            "Room event"
        );
    }));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let relay_handle = relay.start(shutdown_rx).await?;
    tracing::info!(channel = %config.relay.channel, "Event relay started");

    // ── Step 4: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping event relay...");
    let _ = shutdown_tx.send(true);

    if tokio::time::timeout(Duration::from_secs(10), relay_handle)
        .await
        .is_err()
    {
        tracing::warn!("Event relay did not stop within 10s");
    }

    tracing::info!("RoomKey server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
