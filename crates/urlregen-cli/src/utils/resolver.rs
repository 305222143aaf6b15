use anyhow::{Result, anyhow};
use urlregen_core::{StoreRegistry, StoreSelector};

use crate::error::CliError;

/// Resolve a `--store` value to a selector.
///
/// Resolution order:
/// 1) `all` or a numeric store id (existence is checked by the run itself)
/// 2) Case-insensitive match on a storefront code
pub fn resolve_store(requested: &str, registry: &dyn StoreRegistry) -> Result<StoreSelector> {
    if let Ok(selector) = requested.parse::<StoreSelector>() {
        return Ok(selector);
    }

    let code = requested.trim();
    let stores = registry.stores(false).map_err(CliError::from)?;
    stores
        .iter()
        .find(|store| store.code.eq_ignore_ascii_case(code))
        .map(|store| StoreSelector::Store(store.id))
        .ok_or_else(|| CliError::not_found(anyhow!("Store '{code}' does not exist")).into())
}
