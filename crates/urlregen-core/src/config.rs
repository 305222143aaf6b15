//! Configuration management for urlregen.
//!
//! Configuration is stored in TOML and layered as follows:
//!
//! 1. **Built-in defaults** (`invalidate_batch_size = 10000`, `url_suffix = ".html"`)
//! 2. **Config file**: `config.toml` in the platform config directory, or an
//!    explicit path
//! 3. **Environment variables**: `URLREGEN_*` prefix
//!
//! ## Example Configuration File
//!
//! ```toml
//! [regenerate]
//! invalidate_batch_size = 5000
//! url_suffix = ".html"
//!
//! [paths]
//! catalog = "/srv/shop/catalog.json"
//! journal = "/srv/shop/invalidations.jsonl"
//! ```
//!
//! ```rust
//! use urlregen_core::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.regenerate.invalidate_batch_size, 10_000);
//! ```

use crate::cache::DEFAULT_INVALIDATE_BATCH_SIZE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the invalidation batch size.
pub const ENV_INVALIDATE_BATCH_SIZE: &str = "URLREGEN_INVALIDATE_BATCH_SIZE";
/// Environment variable overriding the catalog snapshot path.
pub const ENV_CATALOG: &str = "URLREGEN_CATALOG";
/// Environment variable overriding the directory holding `config.toml`.
pub const ENV_CONFIG_DIR: &str = "URLREGEN_CONFIG_DIR";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Regeneration behavior
    pub regenerate: RegenerateConfig,
    /// File locations
    pub paths: PathsConfig,
}

/// Settings for regeneration runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegenerateConfig {
    /// How many product ids may queue up before cache invalidation is
    /// published. Must be at least 1.
    pub invalidate_batch_size: usize,

    /// Suffix appended to URL keys by the canonical generator.
    pub url_suffix: String,
}

impl Default for RegenerateConfig {
    fn default() -> Self {
        Self {
            invalidate_batch_size: DEFAULT_INVALIDATE_BATCH_SIZE,
            url_suffix: ".html".to_string(),
        }
    }
}

/// File system paths configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Catalog snapshot used when `--catalog` is not given.
    pub catalog: Option<PathBuf>,
    /// Invalidation journal used when `--journal` is not given.
    pub journal: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location, then apply environment
    /// overrides.
    ///
    /// A missing file yields defaults. A malformed file is an error.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from `path`, then apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Location of `config.toml`.
    ///
    /// `URLREGEN_CONFIG_DIR` wins; otherwise the platform config directory:
    /// - Linux: `~/.config/urlregen/config.toml`
    /// - macOS: `~/Library/Application Support/dev.urlregen.urlregen/config.toml`
    /// - Windows: `%APPDATA%\urlregen\urlregen\config\config.toml`
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed).join(CONFIG_FILE_NAME));
            }
        }

        let project_dirs = directories::ProjectDirs::from("dev", "urlregen", "urlregen")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(project_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Apply `URLREGEN_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_INVALIDATE_BATCH_SIZE) {
            self.regenerate.invalidate_batch_size = raw.trim().parse().map_err(|e| {
                Error::Config(format!(
                    "Invalid {ENV_INVALIDATE_BATCH_SIZE} value '{raw}': {e}"
                ))
            })?;
        }

        if let Some(raw) = lookup(ENV_CATALOG) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                self.paths.catalog = Some(PathBuf::from(trimmed));
            }
        }

        Ok(())
    }

    /// Reject settings the driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.regenerate.invalidate_batch_size == 0 {
            return Err(Error::Config(
                "invalidate_batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
