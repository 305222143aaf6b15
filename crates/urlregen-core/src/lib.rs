//! # urlregen-core
//!
//! Regenerates the URL rewrites of catalog products across storefronts.
//!
//! For every selected storefront the regenerator reloads the enabled, visible
//! products of that store, drops their plain rewrites, generates fresh ones and
//! persists them. Products whose new request paths collide with existing ones
//! are skipped and reported instead of aborting the run. Changed product ids
//! are published for cache invalidation in bounded batches.
//!
//! ## Architecture
//!
//! - **Seams** ([`catalog`]): traits for the store registry, product source,
//!   rewrite generator, rewrite store and cache invalidator
//! - **Driver** ([`regenerate`]): [`ProductUrlRegenerator`] and its
//!   [`RegenerateReport`]
//! - **Backends**: [`SnapshotCatalog`] (JSON catalog file),
//!   [`CanonicalUrlGenerator`], [`JournalInvalidator`] (JSONL journal)
//! - **Configuration** ([`config`]) and **errors** ([`error`])
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use urlregen_core::{
//!     CanonicalUrlGenerator, CatalogSnapshot, LogInvalidator, ProductUrlRegenerator,
//!     SnapshotCatalog, StoreSelector,
//! };
//!
//! let catalog = SnapshotCatalog::from_snapshot(CatalogSnapshot::default());
//! let generator = CanonicalUrlGenerator::default();
//! let mut regenerator =
//!     ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, &LogInvalidator);
//!
//! let report = regenerator.execute(&BTreeSet::new(), StoreSelector::All)?;
//! assert_eq!(report.regenerated, 0);
//! assert_eq!(regenerator.regenerated_count(), 0);
//! # Ok::<(), urlregen_core::Error>(())
//! ```

/// Cache invalidation payloads and batching
pub mod cache;
/// Collaborator traits used by the regenerator
pub mod catalog;
/// Configuration loading and overrides
pub mod config;
/// Error types and result aliases
pub mod error;
/// Canonical URL rewrite generation
pub mod generator;
/// Cache invalidation publishers
pub mod journal;
/// The regeneration driver
pub mod regenerate;
/// JSON catalog snapshot backend
pub mod snapshot;
/// Core data types
pub mod types;

pub use cache::{CacheContext, DEFAULT_INVALIDATE_BATCH_SIZE, InvalidationBatch};
pub use catalog::{
    CacheInvalidator, DeleteCriteria, ProductQuery, ProductSource, StoreRegistry, UrlPersist,
    UrlRewriteGenerator,
};
pub use config::{Config, PathsConfig, RegenerateConfig};
pub use error::{Error, Result};
pub use generator::CanonicalUrlGenerator;
pub use journal::{JournalEntry, JournalInvalidator, LogInvalidator, read_journal};
pub use regenerate::{
    ConflictRecord, InvalidationStats, ProductUrlRegenerator, RegenerateReport, StoreSummary,
};
pub use snapshot::{CatalogSnapshot, ProductOverride, ProductRecord, SnapshotCatalog};
pub use types::*;
