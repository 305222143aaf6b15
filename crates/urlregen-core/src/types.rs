use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Catalog product identifier.
pub type ProductId = u64;

/// Storefront identifier.
pub type StoreId = u32;

/// Id of the admin (default) store. It holds global attribute values and is
/// never a storefront of its own.
pub const ADMIN_STORE_ID: StoreId = 0;

/// Entity type recorded on product URL rewrites.
pub const PRODUCT_ENTITY_TYPE: &str = "product";

/// Cache tag under which product pages are cached.
pub const PRODUCT_CACHE_TAG: &str = "cat_p";

/// Redirect type of a plain (non-redirecting) rewrite.
pub const NO_REDIRECT: u16 = 0;

/// Which storefronts a regeneration run covers.
///
/// `All` is its own variant so that no store id (the admin store `0` included)
/// doubles as the "every storefront" marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreSelector {
    /// Every storefront the registry lists.
    #[default]
    All,
    /// A single storefront.
    Store(StoreId),
}

impl StoreSelector {
    /// Whether a storefront with `store_id` is covered by this selector.
    #[must_use]
    pub const fn matches(self, store_id: StoreId) -> bool {
        match self {
            Self::All => true,
            Self::Store(id) => id == store_id,
        }
    }
}

impl fmt::Display for StoreSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Store(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for StoreSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed
            .parse::<StoreId>()
            .map(Self::Store)
            .map_err(|_| Error::Config(format!("Invalid store selector '{trimmed}'")))
    }
}

/// A storefront (sales channel / locale) with its own URL namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storefront {
    /// Store id.
    pub id: StoreId,
    /// Short machine code, e.g. `default` or `fr`.
    pub code: String,
    /// Human readable name used in log lines.
    pub name: String,
    /// Inactive stores are not listed by registries.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Product status attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Product can be sold.
    Enabled,
    /// Product is switched off.
    Disabled,
}

/// Product visibility attribute, ordered from least to most visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only reachable through a parent product.
    NotVisible,
    /// Listed in categories.
    Catalog,
    /// Listed in search results.
    Search,
    /// Listed in categories and search results.
    CatalogSearch,
}

/// A product as loaded for one storefront.
///
/// Store-scoped attribute values have already been resolved by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product id.
    pub id: ProductId,
    /// Stock keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Current URL key, if any.
    pub url_key: Option<String>,
    /// Current URL path, if any.
    pub url_path: Option<String>,
    /// Status in this storefront.
    pub status: ProductStatus,
    /// Visibility in this storefront.
    pub visibility: Visibility,
    /// Storefront this view of the product belongs to.
    pub store_id: StoreId,
}

impl Product {
    /// Rebind this product view to a storefront.
    pub const fn set_store_id(&mut self, store_id: StoreId) {
        self.store_id = store_id;
    }
}

/// A persisted mapping from a request path to a catalog entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRewrite {
    /// Kind of entity the rewrite points at (`product` for everything here).
    pub entity_type: String,
    /// Entity the rewrite points at.
    pub entity_id: ProductId,
    /// Public path; unique per store.
    pub request_path: String,
    /// Internal route or redirect destination.
    pub target_path: String,
    /// `0` for plain rewrites, `301`/`302` for redirects.
    #[serde(default)]
    pub redirect_type: u16,
    /// Store the rewrite is served in.
    pub store_id: StoreId,
}

impl UrlRewrite {
    /// Build a plain product rewrite.
    #[must_use]
    pub fn product(
        entity_id: ProductId,
        store_id: StoreId,
        request_path: impl Into<String>,
        target_path: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: PRODUCT_ENTITY_TYPE.to_string(),
            entity_id,
            request_path: request_path.into(),
            target_path: target_path.into(),
            redirect_type: NO_REDIRECT,
            store_id,
        }
    }
}

/// Generated rewrites keyed by request path.
pub type RewriteMap = BTreeMap<String, UrlRewrite>;
