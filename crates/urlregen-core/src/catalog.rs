//! Collaborator seams used by the regeneration driver.
//!
//! The driver never talks to a concrete catalog. It is handed one
//! implementation of each trait below: a store registry, a product source, a
//! rewrite generator, a rewrite store and a cache invalidator. The JSON
//! snapshot backend in [`crate::snapshot`] implements the storage side; tests
//! use `RefCell`-backed fakes.

use std::collections::BTreeSet;

use crate::cache::CacheContext;
use crate::types::{
    NO_REDIRECT, PRODUCT_ENTITY_TYPE, Product, ProductId, ProductStatus, RewriteMap, StoreId,
    Storefront, UrlRewrite, Visibility,
};
use crate::Result;

/// Attributes the driver needs on every loaded product.
pub const REQUIRED_ATTRIBUTES: [&str; 3] = ["name", "url_path", "url_key"];

/// Lists the configured storefronts.
pub trait StoreRegistry {
    /// Return every active storefront. The admin store is only included when
    /// `with_default` is set.
    fn stores(&self, with_default: bool) -> Result<Vec<Storefront>>;
}

/// Loads products for one storefront.
pub trait ProductSource {
    /// Load the products matching `query`, already scoped to its store.
    fn load(&self, query: &ProductQuery) -> Result<Vec<Product>>;
}

/// Produces the rewrites a product should have in its current store.
pub trait UrlRewriteGenerator {
    /// Generate rewrites keyed by request path.
    fn generate(&self, product: &Product) -> Result<RewriteMap>;
}

/// Persists URL rewrites.
pub trait UrlPersist {
    /// Delete every rewrite matching `criteria`.
    fn delete_by_criteria(&self, criteria: &DeleteCriteria) -> Result<()>;

    /// Replace the product's rewrites with `rewrites`.
    ///
    /// Must fail with [`crate::Error::UrlConflict`] when a request path is
    /// already taken in the target store, and must not persist anything in
    /// that case.
    fn replace(&self, rewrites: &RewriteMap) -> Result<()>;
}

/// Publishes cache invalidation notifications.
pub trait CacheInvalidator {
    /// Publish a "clean cache by tags" notification for `context`.
    fn clean_by_tags(&self, context: &CacheContext) -> Result<()>;
}

/// Filter for loading the products whose URLs get regenerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Store to scope the load to.
    pub store_id: StoreId,
    /// Restrict to these ids; empty means no restriction.
    pub ids: BTreeSet<ProductId>,
    /// Required status.
    pub status: ProductStatus,
    /// Visibility must be strictly greater than this.
    pub visibility_above: Visibility,
    /// Attributes to select alongside the defaults.
    pub attributes: Vec<String>,
}

impl ProductQuery {
    /// The query used for regeneration: enabled, visible products of a store,
    /// optionally narrowed to `ids`.
    #[must_use]
    pub fn regenerable(store_id: StoreId, ids: &BTreeSet<ProductId>) -> Self {
        Self {
            store_id,
            ids: ids.clone(),
            status: ProductStatus::Enabled,
            visibility_above: Visibility::NotVisible,
            attributes: REQUIRED_ATTRIBUTES.iter().map(ToString::to_string).collect(),
        }
    }

    /// Whether a store-resolved product passes the status, visibility and id filters.
    #[must_use]
    pub fn accepts(&self, product: &Product) -> bool {
        product.status == self.status
            && product.visibility > self.visibility_above
            && (self.ids.is_empty() || self.ids.contains(&product.id))
    }
}

/// Selects the rewrites to drop before regenerating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCriteria {
    /// Owning entity.
    pub entity_id: ProductId,
    /// Owning entity type.
    pub entity_type: String,
    /// Only rewrites with this redirect type are removed.
    pub redirect_type: u16,
    /// Store the rewrites are served in.
    pub store_id: StoreId,
}

impl DeleteCriteria {
    /// Plain product rewrites of `entity_id` in `store_id`. Custom redirects survive.
    #[must_use]
    pub fn product(entity_id: ProductId, store_id: StoreId) -> Self {
        Self {
            entity_id,
            entity_type: PRODUCT_ENTITY_TYPE.to_string(),
            redirect_type: NO_REDIRECT,
            store_id,
        }
    }

    /// Whether `rewrite` is selected by these criteria.
    #[must_use]
    pub fn matches(&self, rewrite: &UrlRewrite) -> bool {
        rewrite.entity_id == self.entity_id
            && rewrite.entity_type == self.entity_type
            && rewrite.redirect_type == self.redirect_type
            && rewrite.store_id == self.store_id
    }
}
