//! urlregen CLI - regenerate product URL rewrites per storefront
//!
//! This is the library half of the `urlregen` binary: argument parsing,
//! logging setup and command dispatch. Command implementations live in
//! their own modules.
use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
pub mod error;
mod output;
mod utils;

use crate::utils::initialize_logging;
use cli::{Cli, Commands};

/// Execute the urlregen CLI with the current process arguments.
///
/// # Errors
///
/// Returns an error if logging cannot be initialized or the command fails.
/// [`error::exit_code_from_error`] maps it to an exit code.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Regenerate(args) => commands::regenerate(cli, args),
        Commands::Stores { catalog, format } => {
            commands::list_stores(cli, catalog.as_deref(), format.resolve())
        },
    }
}
