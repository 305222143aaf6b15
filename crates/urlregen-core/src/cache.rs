//! Cache invalidation payloads and batching.
//!
//! Product ids whose rewrites changed are collected in an
//! [`InvalidationBatch`]. Once the batch grows past its limit it is drained into
//! a [`CacheContext`], which is what cache invalidators publish. The limit keeps
//! every notification bounded no matter how large the catalog is.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Default number of product ids a batch may hold before it must be flushed.
pub const DEFAULT_INVALIDATE_BATCH_SIZE: usize = 10_000;

/// Entities to invalidate, grouped by cache tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheContext {
    tags: BTreeMap<String, BTreeSet<ProductId>>,
}

impl CacheContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register entity ids under a cache tag.
    pub fn register_entities<I>(&mut self, tag: &str, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = ProductId>,
    {
        self.tags.entry(tag.to_string()).or_default().extend(ids);
        self
    }

    /// Registered ids per tag.
    #[must_use]
    pub const fn tags(&self) -> &BTreeMap<String, BTreeSet<ProductId>> {
        &self.tags
    }

    /// Flattened cache identities, e.g. `cat_p_101`.
    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        self.tags
            .iter()
            .flat_map(|(tag, ids)| ids.iter().map(move |id| format!("{tag}_{id}")))
            .collect()
    }

    /// Total number of registered ids across tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.values().map(BTreeSet::len).sum()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Product ids waiting for cache invalidation.
#[derive(Debug, Clone)]
pub struct InvalidationBatch {
    ids: BTreeSet<ProductId>,
    limit: usize,
}

impl InvalidationBatch {
    /// Create a batch that asks to be flushed once it holds more than `limit` ids.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            ids: BTreeSet::new(),
            limit,
        }
    }

    /// Add an id. Returns `true` when the batch now exceeds its limit.
    pub fn push(&mut self, id: ProductId) -> bool {
        self.ids.insert(id);
        self.ids.len() > self.limit
    }

    /// Drain the pending ids, leaving the batch empty.
    pub fn take(&mut self) -> BTreeSet<ProductId> {
        std::mem::take(&mut self.ids)
    }

    /// Whether no ids are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for InvalidationBatch {
    fn default() -> Self {
        Self::new(DEFAULT_INVALIDATE_BATCH_SIZE)
    }
}
