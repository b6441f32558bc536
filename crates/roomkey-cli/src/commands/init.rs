//! Store initialization command.

use clap::Args;

use crate::output;
use roomkey_core::error::AppError;

/// Arguments for init
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Skip confirmation
    #[arg(long)]
    pub force: bool,
}

/// Wipe the store, reset the room counter, and fill the key pool
pub async fn execute(args: &InitArgs, config_path: &str) -> Result<(), AppError> {
    if !args.force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt("Erase ALL rooms, keys, and metadata in the store?")
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let registry = super::open_registry(config_path).await?;
    let generated = registry.init().await?;

    output::print_success(&format!(
        "Store initialized with {} unused room keys",
        generated
    ));
    Ok(())
}
