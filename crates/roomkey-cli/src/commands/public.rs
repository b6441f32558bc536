//! Public room listing CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use roomkey_core::error::AppError;
use roomkey_core::types::RoomId;

/// Arguments for public room commands
#[derive(Debug, Args)]
pub struct PublicArgs {
    /// Public subcommand
    #[command(subcommand)]
    pub command: PublicCommand,
}

/// Public room subcommands
#[derive(Debug, Subcommand)]
pub enum PublicCommand {
    /// List public rooms
    List,
    /// Make ROOM public
    Add {
        /// Room ID
        room: RoomId,
    },
    /// Make ROOM private
    Remove {
        /// Room ID
        room: RoomId,
    },
    /// Show the public room at INDEX (negative counts from the end)
    At {
        /// List index
        #[arg(allow_hyphen_values = true)]
        index: i64,
    },
}

/// Public room display row
#[derive(Debug, Serialize, Tabled)]
struct PublicRow {
    /// Position
    index: usize,
    /// Room ID
    room_id: u64,
}

/// Execute public room commands
pub async fn execute(
    args: &PublicArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let registry = super::open_registry(config_path).await?;
    let public = registry.public();

    match &args.command {
        PublicCommand::List => {
            let rows: Vec<PublicRow> = public
                .public_rooms()
                .await?
                .into_iter()
                .enumerate()
                .map(|(index, room)| PublicRow {
                    index,
                    room_id: room.get(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        PublicCommand::Add { room } => {
            if public.make_public(*room).await? {
                output::print_success(&format!("Room {} is now public", room));
            } else {
                output::print_warning(&format!("Room {} is already public", room));
            }
        }
        PublicCommand::Remove { room } => {
            if public.make_private(*room).await? {
                output::print_success(&format!("Room {} is now private", room));
            } else {
                output::print_warning(&format!("Room {} was not public", room));
            }
        }
        PublicCommand::At { index } => match public.public_room_at(*index).await? {
            Some(room) => println!("{}", room),
            None => output::print_warning(&format!("No public room at index {}", index)),
        },
    }

    Ok(())
}
