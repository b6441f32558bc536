//! Room membership CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use roomkey_core::error::AppError;
use roomkey_core::types::{RoomId, UserId};

/// Arguments for room commands
#[derive(Debug, Args)]
pub struct RoomArgs {
    /// Room subcommand
    #[command(subcommand)]
    pub command: RoomCommand,
}

/// Room subcommands
#[derive(Debug, Subcommand)]
pub enum RoomCommand {
    /// Create a room with USER as its first member
    Create {
        /// User ID
        user: String,
    },
    /// Add USER to ROOM
    Join {
        /// User ID
        user: String,
        /// Room ID
        room: RoomId,
    },
    /// Remove USER from ROOM
    Leave {
        /// User ID
        user: String,
        /// Room ID
        room: RoomId,
    },
    /// List the members of ROOM
    Users {
        /// Room ID
        room: RoomId,
    },
    /// Show membership, key, and visibility of ROOM
    Info {
        /// Room ID
        room: RoomId,
    },
}

/// Member display row
#[derive(Debug, Serialize, Tabled)]
struct MemberRow {
    /// User ID
    user: String,
}

/// Room summary
#[derive(Debug, Serialize)]
struct RoomInfo {
    room_id: RoomId,
    exists: bool,
    user_count: u64,
    key: Option<String>,
    public: bool,
}

/// Execute room commands
pub async fn execute(
    args: &RoomArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let registry = super::open_registry(config_path).await?;
    let membership = registry.membership();

    match &args.command {
        RoomCommand::Create { user } => {
            let room = membership.create_room(&UserId::new(user.as_str())).await?;
            output::print_success(&format!("Created room {} for '{}'", room, user));
        }
        RoomCommand::Join { user, room } => {
            membership.join_room(&UserId::new(user.as_str()), *room).await?;
            output::print_success(&format!("'{}' joined room {}", user, room));
        }
        RoomCommand::Leave { user, room } => {
            let remaining = membership
                .leave_room(&UserId::new(user.as_str()), *room)
                .await?;
            output::print_success(&format!(
                "'{}' left room {} ({} remaining)",
                user, room, remaining
            ));
        }
        RoomCommand::Users { room } => {
            let rows: Vec<MemberRow> = membership
                .users(*room)
                .await?
                .into_iter()
                .map(|u| MemberRow {
                    user: u.into_inner(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        RoomCommand::Info { room } => {
            let info = RoomInfo {
                room_id: *room,
                exists: membership.room_exists(*room).await?,
                user_count: membership.user_count(*room).await?,
                key: registry
                    .keys()
                    .key_for_room(*room)
                    .await?
                    .map(|k| k.into_inner()),
                public: registry.public().is_public(*room).await?,
            };
            output::print_item(&info, format);
        }
    }

    Ok(())
}
