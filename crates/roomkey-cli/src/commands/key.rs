//! Room key CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{self, OutputFormat};
use roomkey_core::error::AppError;
use roomkey_core::types::{RoomId, RoomKey};

/// Arguments for key commands
#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Key subcommand
    #[command(subcommand)]
    pub command: KeyCommand,
}

/// Key subcommands
#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Issue (or show) the key of ROOM
    Get {
        /// Room ID
        room: RoomId,
    },
    /// Unbind KEY from ROOM and return it to the pool
    Return {
        /// Room ID
        room: RoomId,
        /// Room key
        key: String,
    },
    /// Look up the room a key is bound to
    Resolve {
        /// Room key
        key: String,
    },
    /// Show the key pool state
    Pool,
}

/// Pool display
#[derive(Debug, Serialize)]
struct PoolInfo {
    unused: u64,
    configured_size: usize,
}

/// Execute key commands
pub async fn execute(
    args: &KeyArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let registry = super::open_registry(config_path).await?;
    let keys = registry.keys();

    match &args.command {
        KeyCommand::Get { room } => {
            let key = keys.get_key(*room).await?;
            println!("{}", key);
        }
        KeyCommand::Return { room, key } => {
            keys.return_key(*room, &RoomKey::new(key.as_str())).await?;
            output::print_success(&format!("Key '{}' returned to the pool", key));
        }
        KeyCommand::Resolve { key } => {
            let room = keys.room_for_key(&RoomKey::new(key.as_str())).await?;
            println!("{}", room);
        }
        KeyCommand::Pool => {
            let state = registry.allocator().pool_state().await?;
            let info = PoolInfo {
                unused: state.unused,
                configured_size: state.configured_size,
            };
            if state.unused == 0 {
                output::print_warning("Key pool is empty; run `roomkey init` to repopulate it");
            }
            output::print_item(&info, format);
        }
    }

    Ok(())
}
