//! `urlregen stores`: list the storefronts a run can target.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use urlregen_core::StoreRegistry;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::{OutputFormat, print_json};
use crate::utils::settings::{catalog_path, load_config, open_catalog};

/// Print the storefronts of the catalog.
pub fn execute(cli: &Cli, catalog: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = load_config(cli)?;
    let path = catalog_path(catalog, &config)?;
    let catalog = open_catalog(&path)?;
    let stores = catalog.stores(false).map_err(CliError::from)?;

    match format {
        OutputFormat::Json => print_json(&stores)?,
        OutputFormat::Text => {
            if stores.is_empty() {
                println!("No storefronts in {}", path.display());
                return Ok(());
            }
            for store in &stores {
                println!("{:>5}  {:<16} {}", store.id, store.code.cyan(), store.name);
            }
        },
    }
    Ok(())
}
