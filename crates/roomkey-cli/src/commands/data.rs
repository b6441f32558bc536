//! Room metadata CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use roomkey_core::error::AppError;
use roomkey_core::types::RoomId;

/// Arguments for data commands
#[derive(Debug, Args)]
pub struct DataArgs {
    /// Data subcommand
    #[command(subcommand)]
    pub command: DataCommand,
}

/// Data subcommands
#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// Set FIELD to VALUE on ROOM
    Set {
        /// Room ID
        room: RoomId,
        /// Field name
        field: String,
        /// Field value
        value: String,
    },
    /// Print FIELD of ROOM
    Get {
        /// Room ID
        room: RoomId,
        /// Field name
        field: String,
    },
    /// Delete FIELD from ROOM
    Del {
        /// Room ID
        room: RoomId,
        /// Field name
        field: String,
    },
    /// Show all metadata of ROOM
    Show {
        /// Room ID
        room: RoomId,
    },
}

/// Metadata display row
#[derive(Debug, Serialize, Tabled)]
struct FieldRow {
    /// Field
    field: String,
    /// Value
    value: String,
}

/// Execute data commands
pub async fn execute(
    args: &DataArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let registry = super::open_registry(config_path).await?;
    let data = registry.data();

    match &args.command {
        DataCommand::Set { room, field, value } => {
            data.set_room_data_var(*room, field, value).await?;
            output::print_success(&format!("Set '{}' on room {}", field, room));
        }
        DataCommand::Get { room, field } => match data.get_room_data_var(*room, field).await? {
            Some(value) => println!("{}", value),
            None => output::print_warning(&format!("Field '{}' is not set", field)),
        },
        DataCommand::Del { room, field } => match data.del_room_data_var(*room, field).await? {
            Some(previous) => {
                output::print_success(&format!("Deleted '{}' (was '{}')", field, previous))
            }
            None => output::print_warning(&format!("Field '{}' is not set", field)),
        },
        DataCommand::Show { room } => {
            let mut rows: Vec<FieldRow> = data
                .get_room_data(*room)
                .await?
                .into_iter()
                .map(|(field, value)| FieldRow { field, value })
                .collect();
            rows.sort_by(|a, b| a.field.cmp(&b.field));
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
