//! Product URL rewrite regeneration across storefronts.
//!
//! [`ProductUrlRegenerator`] walks every selected storefront, reloads the
//! enabled and visible products of that store, and for each product:
//!
//! 1. deletes its plain rewrites in the store,
//! 2. asks the generator for fresh rewrites,
//! 3. persists them, isolating request-path conflicts to that product,
//! 4. queues the product id for cache invalidation.
//!
//! Invalidation is published in bounded batches: whenever the pending batch
//! grows past the configured size, and once more at the end of each store.
//!
//! Per-run state (counters, conflicts, the pending batch) lives in a run
//! context created by [`ProductUrlRegenerator::execute`] and returned as a
//! [`RegenerateReport`]. The driver itself only keeps the running total of
//! persisted rewrites, updated as each store finishes, so a run that fails
//! partway still reports what earlier stores wrote.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::cache::{CacheContext, DEFAULT_INVALIDATE_BATCH_SIZE, InvalidationBatch};
use crate::catalog::{
    CacheInvalidator, DeleteCriteria, ProductQuery, ProductSource, StoreRegistry, UrlPersist,
    UrlRewriteGenerator,
};
use crate::types::{PRODUCT_CACHE_TAG, Product, ProductId, StoreId, StoreSelector, Storefront};
use crate::{Error, Result};

/// Outcome of one storefront within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    /// Store id.
    pub store_id: StoreId,
    /// Store code.
    pub code: String,
    /// Store name.
    pub name: String,
    /// Products visited, conflicting ones included.
    pub products: usize,
    /// Rewrites persisted.
    pub regenerated: usize,
    /// Products whose rewrites were rejected as duplicates.
    pub conflicts: usize,
}

impl StoreSummary {
    fn new(store: &Storefront) -> Self {
        Self {
            store_id: store.id,
            code: store.code.clone(),
            name: store.name.clone(),
            products: 0,
            regenerated: 0,
            conflicts: 0,
        }
    }
}

/// A product whose generated rewrites could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    /// Store the rewrites were meant for.
    pub store_id: StoreId,
    /// Product id.
    pub product_id: ProductId,
    /// Product SKU.
    pub sku: String,
    /// Error reported by the rewrite store.
    pub message: String,
    /// Request paths that were attempted.
    pub request_paths: Vec<String>,
}

/// Cache invalidation activity of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationStats {
    /// Notifications attempted.
    pub flushes: usize,
    /// Product ids sent across all notifications.
    pub product_ids: usize,
    /// Notifications that failed to publish.
    pub failures: usize,
}

impl InvalidationStats {
    const fn record(&mut self, ids: usize, published: bool) {
        self.flushes += 1;
        self.product_ids += ids;
        if !published {
            self.failures += 1;
        }
    }
}

/// Result of [`ProductUrlRegenerator::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegenerateReport {
    /// Store selector the run was started with.
    pub selector: StoreSelector,
    /// Rewrites persisted across all stores.
    pub regenerated: usize,
    /// Per-store outcomes in processing order.
    pub stores: Vec<StoreSummary>,
    /// Products skipped because of request-path conflicts.
    pub conflicts: Vec<ConflictRecord>,
    /// Cache invalidation activity.
    pub invalidation: InvalidationStats,
}

struct RunContext {
    regenerated: usize,
    stores: Vec<StoreSummary>,
    conflicts: Vec<ConflictRecord>,
    batch: InvalidationBatch,
    invalidation: InvalidationStats,
}

impl RunContext {
    fn new(batch_size: usize) -> Self {
        Self {
            regenerated: 0,
            stores: Vec::new(),
            conflicts: Vec::new(),
            batch: InvalidationBatch::new(batch_size),
            invalidation: InvalidationStats::default(),
        }
    }

    fn into_report(self, selector: StoreSelector) -> RegenerateReport {
        RegenerateReport {
            selector,
            regenerated: self.regenerated,
            stores: self.stores,
            conflicts: self.conflicts,
            invalidation: self.invalidation,
        }
    }
}

/// Regenerates product URL rewrites for one or all storefronts.
///
/// Taking `&mut self` in [`execute`](Self::execute) keeps runs on one
/// instance strictly sequential.
pub struct ProductUrlRegenerator<'a> {
    stores: &'a dyn StoreRegistry,
    products: &'a dyn ProductSource,
    generator: &'a dyn UrlRewriteGenerator,
    persist: &'a dyn UrlPersist,
    cache: &'a dyn CacheInvalidator,
    invalidate_batch_size: usize,
    regenerated: usize,
    last_report: Option<RegenerateReport>,
}

impl<'a> ProductUrlRegenerator<'a> {
    /// Wire a regenerator to its collaborators.
    pub fn new(
        stores: &'a dyn StoreRegistry,
        products: &'a dyn ProductSource,
        generator: &'a dyn UrlRewriteGenerator,
        persist: &'a dyn UrlPersist,
        cache: &'a dyn CacheInvalidator,
    ) -> Self {
        Self {
            stores,
            products,
            generator,
            persist,
            cache,
            invalidate_batch_size: DEFAULT_INVALIDATE_BATCH_SIZE,
            regenerated: 0,
            last_report: None,
        }
    }

    /// Override how many product ids may queue up before invalidation is published.
    #[must_use]
    pub const fn with_invalidate_batch_size(mut self, size: usize) -> Self {
        self.invalidate_batch_size = size;
        self
    }

    /// Regenerate rewrites for `product_ids` (all eligible products when empty)
    /// in the stores picked by `selector`.
    ///
    /// # Errors
    ///
    /// Fails when the store list or a product load fails, when the selected
    /// store does not exist, when deleting old rewrites or generating new ones
    /// fails, or when persisting fails for a reason other than a request-path
    /// conflict. Conflicts are recorded in the report instead.
    pub fn execute(
        &mut self,
        product_ids: &BTreeSet<ProductId>,
        selector: StoreSelector,
    ) -> Result<RegenerateReport> {
        self.regenerated = 0;
        self.last_report = None;
        let mut run = RunContext::new(self.invalidate_batch_size);

        let stores = self.stores.stores(false)?;
        if let StoreSelector::Store(id) = selector {
            if !stores.iter().any(|store| store.id == id) {
                return Err(Error::NotFound(format!("Store with id {id} does not exist")));
            }
        }

        for store in stores.iter().filter(|store| selector.matches(store.id)) {
            self.regenerate_store(store, product_ids, &mut run)?;
            self.regenerated = run.regenerated;
        }

        let report = run.into_report(selector);
        self.last_report = Some(report.clone());
        Ok(report)
    }

    fn regenerate_store(
        &self,
        store: &Storefront,
        product_ids: &BTreeSet<ProductId>,
        run: &mut RunContext,
    ) -> Result<()> {
        let query = ProductQuery::regenerable(store.id, product_ids);
        let products = self.products.load(&query)?;
        let mut summary = StoreSummary::new(store);

        for mut product in products {
            info!(
                sku = %product.sku,
                product_id = product.id,
                store = %store.name,
                "Regenerating urls for {} ({}) in store {}",
                product.sku,
                product.id,
                store.name
            );
            product.set_store_id(store.id);

            self.persist
                .delete_by_criteria(&DeleteCriteria::product(product.id, store.id))?;

            let rewrites = self.generator.generate(&product)?;
            match self.persist.replace(&rewrites) {
                Ok(()) => summary.regenerated += rewrites.len(),
                Err(err) if err.is_conflict() => {
                    let request_paths: Vec<String> = rewrites.keys().cloned().collect();
                    record_conflict(store, &product, &err, request_paths, run);
                    summary.conflicts += 1;
                },
                Err(err) => return Err(err),
            }
            summary.products += 1;

            if run.batch.push(product.id) {
                self.flush(run);
            }
        }

        info!(
            store = %store.name,
            regenerated = summary.regenerated,
            "Done regenerating. Regenerated {} urls for store {}",
            summary.regenerated,
            store.name
        );
        run.regenerated += summary.regenerated;
        run.stores.push(summary);

        if !run.batch.is_empty() {
            self.flush(run);
        }
        Ok(())
    }

    fn flush(&self, run: &mut RunContext) {
        let ids = run.batch.take();
        debug!(count = ids.len(), "Flushing cache invalidation batch");
        let published = self.invalidate_cache(&ids);
        run.invalidation.record(ids.len(), published);
    }

    /// Publish a clean-by-tags notification for `product_ids` under the product
    /// cache tag.
    ///
    /// Returns `false` when publishing failed; the failure is logged and never
    /// propagated. An empty id set publishes nothing and returns `true`.
    pub fn invalidate_cache(&self, product_ids: &BTreeSet<ProductId>) -> bool {
        if product_ids.is_empty() {
            return true;
        }

        let mut context = CacheContext::new();
        context.register_entities(PRODUCT_CACHE_TAG, product_ids.iter().copied());

        match self.cache.clean_by_tags(&context) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    category = err.category(),
                    count = product_ids.len(),
                    "Invalidate cache error : {err}"
                );
                false
            },
        }
    }

    /// Rewrites persisted by the stores the most recent run finished; `0`
    /// before any run.
    #[must_use]
    pub const fn regenerated_count(&self) -> usize {
        self.regenerated
    }

    /// Report of the most recent successful run.
    #[must_use]
    pub const fn last_report(&self) -> Option<&RegenerateReport> {
        self.last_report.as_ref()
    }
}

fn record_conflict(
    store: &Storefront,
    product: &Product,
    err: &Error,
    request_paths: Vec<String>,
    run: &mut RunContext,
) {
    error!(
        store_id = store.id,
        product_id = product.id,
        sku = %product.sku,
        "Duplicated url for store ID {}, product {} ({}) - {} Generated URLs:\n{}",
        store.id,
        product.id,
        product.sku,
        err,
        request_paths.join("\n")
    );
    run.conflicts.push(ConflictRecord {
        store_id: store.id,
        product_id: product.id,
        sku: product.sku.clone(),
        message: err.to_string(),
        request_paths,
    });
}
