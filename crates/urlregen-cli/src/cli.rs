//! # CLI Structure and Argument Parsing
//!
//! `urlregen` follows the usual command/subcommand layout:
//!
//! - **Global options**: `--verbose`, `--quiet`, `--no-color`, `--config`,
//!   `--config-dir`
//! - **Subcommands**: `regenerate` (alias `regen`) and `stores`
//!
//! ```bash
//! # Every eligible product in every storefront
//! urlregen regenerate --catalog catalog.json
//!
//! # Two products in the storefront with code "fr"
//! urlregen regen 101 102 --store fr --catalog catalog.json
//!
//! # Storefront ids and codes accepted by --store
//! urlregen stores --catalog catalog.json --format json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use urlregen_core::ProductId;

use crate::utils::cli_args::FormatArg;

/// Main CLI structure for the `urlregen` command.
#[derive(Parser, Clone, Debug)]
#[command(name = "urlregen")]
#[command(version)]
#[command(about = "urlregen - Regenerate product URL rewrites per storefront", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logs
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to configuration file (overrides autodiscovery). Also via `URLREGEN_CONFIG`.
    #[arg(long, global = true, value_name = "FILE", env = "URLREGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory containing config.toml (overrides autodiscovery). Also via `URLREGEN_CONFIG_DIR`.
    #[arg(
        long = "config-dir",
        global = true,
        value_name = "DIR",
        env = "URLREGEN_CONFIG_DIR"
    )]
    pub config_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Regenerate product URL rewrites
    #[command(alias = "regen")]
    Regenerate(RegenerateArgs),

    /// List the storefronts that can be passed to `--store`
    Stores {
        /// Catalog snapshot (defaults to `paths.catalog` / `URLREGEN_CATALOG`)
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        #[command(flatten)]
        format: FormatArg,
    },
}

/// Arguments of `urlregen regenerate`.
#[derive(clap::Args, Clone, Debug)]
pub struct RegenerateArgs {
    /// Products to regenerate (all eligible products when omitted)
    #[arg(value_name = "PRODUCT_IDS")]
    pub product_ids: Vec<ProductId>,

    /// Storefront to regenerate: `all`, a store id, or a store code
    #[arg(short = 's', long, default_value = "all", value_name = "STORE")]
    pub store: String,

    /// Catalog snapshot (defaults to `paths.catalog` / `URLREGEN_CATALOG`)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Invalidation journal to append to (defaults to `paths.journal`; logs only when unset)
    #[arg(long, value_name = "FILE")]
    pub journal: Option<PathBuf>,

    /// Product ids per cache invalidation notification
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: Option<u64>,

    /// Run without saving the snapshot or writing to the journal
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub format: FormatArg,
}

impl Cli {
    /// Output format of the selected command.
    #[must_use]
    pub fn format(&self) -> crate::output::OutputFormat {
        match &self.command {
            Commands::Regenerate(args) => args.format.resolve(),
            Commands::Stores { format, .. } => format.resolve(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_regen_alias_and_ids() {
        let cli = Cli::try_parse_from(["urlregen", "regen", "101", "102", "-s", "fr"]).unwrap();
        let Commands::Regenerate(args) = cli.command else {
            unreachable!("regen must map to regenerate");
        };
        assert_eq!(args.product_ids, vec![101, 102]);
        assert_eq!(args.store, "fr");
        assert!(!args.dry_run);
    }

    #[test]
    fn test_store_defaults_to_all() {
        let cli = Cli::try_parse_from(["urlregen", "regenerate", "--json"]).unwrap();
        assert_eq!(cli.format(), OutputFormat::Json);
        let Commands::Regenerate(args) = cli.command else {
            unreachable!("expected regenerate");
        };
        assert_eq!(args.store, "all");
        assert!(args.product_ids.is_empty());
    }

    #[test]
    fn test_batch_size_must_be_positive() {
        assert!(Cli::try_parse_from(["urlregen", "regenerate", "--batch-size", "0"]).is_err());
        assert!(Cli::try_parse_from(["urlregen", "regenerate", "--batch-size", "5"]).is_ok());
    }

    #[test]
    fn test_non_numeric_product_id_is_rejected() {
        assert!(Cli::try_parse_from(["urlregen", "regenerate", "abc"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["urlregen", "-v", "-q", "stores"]).is_err());
    }
}
