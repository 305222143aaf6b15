use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;
use urlregen_core::config::ENV_CATALOG;
use urlregen_core::{Config, SnapshotCatalog};

use crate::cli::Cli;
use crate::error::CliError;

/// Load configuration honoring `--config` and `--config-dir`.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let path = config_file(cli.config.as_deref(), cli.config_dir.as_deref());
    let config = match path {
        Some(path) => {
            debug!("using config file {}", path.display());
            Config::load_from(&path)
        },
        None => Config::load(),
    };
    config.map_err(|err| CliError::from(err).into())
}

fn config_file(file: Option<&Path>, dir: Option<&Path>) -> Option<PathBuf> {
    file.filter(|path| !path.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| {
            dir.filter(|dir| !dir.as_os_str().is_empty())
                .map(|dir| dir.join("config.toml"))
        })
}

/// The snapshot to work on: the flag wins over configuration.
pub fn catalog_path(flag: Option<&Path>, config: &Config) -> Result<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.paths.catalog.clone())
        .ok_or_else(|| {
            CliError::usage(anyhow!(
                "No catalog snapshot given; pass --catalog or set {ENV_CATALOG}"
            ))
            .into()
        })
}

/// Open the snapshot at `path`, keeping the core error category.
pub fn open_catalog(path: &Path) -> Result<SnapshotCatalog> {
    SnapshotCatalog::open(path)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to open catalog {}", path.display()))
}
