//! Shared helpers for the CLI commands.
//!
//! - [`cli_args`]: reusable clap argument groups
//! - [`logging`]: tracing subscriber and color setup
//! - [`resolver`]: `--store` resolution
//! - [`settings`]: configuration and catalog location

pub mod cli_args;
pub mod logging;
pub mod resolver;
pub mod settings;

pub use logging::initialize_logging;
