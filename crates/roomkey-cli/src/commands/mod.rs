//! CLI command definitions and dispatch.

pub mod config;
pub mod data;
pub mod init;
pub mod key;
pub mod public;
pub mod relay;
pub mod room;
pub mod status;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use roomkey_core::config::AppConfig;
use roomkey_core::error::AppError;
use roomkey_core::traits::StoreProvider;
use roomkey_service::RoomRegistry;
use roomkey_store::StoreManager;

/// RoomKey: room membership and room key distribution
#[derive(Debug, Parser)]
#[command(name = "roomkey", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reset the store and repopulate the key pool
    Init(init::InitArgs),
    /// Room membership
    Room(room::RoomArgs),
    /// Room keys and the key pool
    Key(key::KeyArgs),
    /// Room metadata
    Data(data::DataArgs),
    /// Public room listing
    Public(public::PublicArgs),
    /// Watch membership events
    Relay(relay::RelayArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Store health and pool status
    Status,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Init(args) => init::execute(args, &self.config).await,
            Commands::Room(args) => room::execute(args, &self.config, self.format).await,
            Commands::Key(args) => key::execute(args, &self.config, self.format).await,
            Commands::Data(args) => data::execute(args, &self.config, self.format).await,
            Commands::Public(args) => public::execute(args, &self.config, self.format).await,
            Commands::Relay(args) => relay::execute(args, &self.config).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
            Commands::Status => status::execute(&self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: connect to the configured store
///
/// The memory provider lives only as long as this process, so it is
/// rejected: every command would see an empty store.
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn StoreProvider>, AppError> {
    if config.store.provider == "memory" {
        return Err(AppError::configuration(
            "CLI commands require a shared store (store.provider = \"redis\")",
        ));
    }
    let store = StoreManager::new(&config.store).await?;
    Ok(Arc::new(store))
}

/// Helper: load configuration and build a room registry on the configured store
pub async fn open_registry(config_path: &str) -> Result<RoomRegistry, AppError> {
    let config = load_config(config_path)?;
    let store = connect_store(&config).await?;
    RoomRegistry::new(store, &config)
}

#[cfg(test)]
mod tests {
    use roomkey_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_memory_store_is_rejected() {
        let config = AppConfig::default();
        assert_eq!(config.store.provider, "memory");

        let err = connect_store(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_open_registry_rejects_default_config() {
        let err = open_registry("does/not/exist.toml").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
