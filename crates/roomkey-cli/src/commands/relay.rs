//! Event relay CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use tokio::sync::watch;

use roomkey_core::error::AppError;
use roomkey_core::events::RoomEvent;
use roomkey_core::types::RoomId;
use roomkey_realtime::EventRelay;

/// Arguments for relay commands
#[derive(Debug, Args)]
pub struct RelayArgs {
    /// Relay subcommand
    #[command(subcommand)]
    pub command: RelayCommand,
}

/// Relay subcommands
#[derive(Debug, Subcommand)]
pub enum RelayCommand {
    /// Print membership events until interrupted
    Watch {
        /// Only print events for this room
        #[arg(short, long)]
        room: Option<RoomId>,
    },
}

/// Execute relay commands
pub async fn execute(args: &RelayArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::connect_store(&config).await?;
    let relay = EventRelay::new(store, &config.relay);

    match &args.command {
        RelayCommand::Watch { room } => {
            let printer = Arc::new(|event: &RoomEvent| {
                let users: Vec<&str> = event.users.iter().map(|u| u.as_str()).collect();
                println!(
                    "room {:>6}  {:<5}  {:<20}  [{}]",
                    event.room_id.get(),
                    event.action.as_str(),
                    event.user.as_str(),
                    users.join(", ")
                );
            });

            match room {
                Some(room_id) => relay.on_room(*room_id, printer),
                None => relay.on_all(printer),
            };

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let handle = relay.start(shutdown_rx).await?;
            println!(
                "Watching '{}' (Ctrl+C to stop)...",
                config.relay.channel
            );

            tokio::signal::ctrl_c()
                .await
                .map_err(|e| AppError::internal(format!("Failed to listen for Ctrl+C: {}", e)))?;

            let _ = shutdown_tx.send(true);
            let _ = handle.await;
        }
    }

    Ok(())
}
