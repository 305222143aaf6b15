//! JSON catalog snapshot backend.
//!
//! A snapshot is a single JSON document holding storefronts, products with
//! their store-scoped overrides, and the URL rewrite table:
//!
//! ```json
//! {
//!   "stores": [{ "id": 1, "code": "default", "name": "Main Store" }],
//!   "products": [{
//!     "id": 101, "sku": "TEE-BLUE", "name": "Blue Tee", "url_key": "blue-tee",
//!     "status": "enabled", "visibility": "catalog_search",
//!     "store_ids": [1], "overrides": { "1": { "url_key": "tee-bleu" } }
//!   }],
//!   "url_rewrites": []
//! }
//! ```
//!
//! [`SnapshotCatalog`] serves the store registry, product source and rewrite
//! store seams from that document and writes it back with [`SnapshotCatalog::save`].

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{DeleteCriteria, ProductQuery, ProductSource, StoreRegistry, UrlPersist};
use crate::types::{
    ADMIN_STORE_ID, Product, ProductId, ProductStatus, RewriteMap, StoreId, Storefront,
    UrlRewrite, Visibility,
};
use crate::{Error, Result};

/// Store-scoped attribute values. Unset fields fall back to the global value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductOverride {
    /// Store-level name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Store-level URL key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_key: Option<String>,
    /// Store-level status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    /// Store-level visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// A product as stored: global attribute values plus store overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product id.
    pub id: ProductId,
    /// Stock keeping unit.
    pub sku: String,
    /// Global name.
    pub name: String,
    /// Global URL key.
    #[serde(default)]
    pub url_key: Option<String>,
    /// Global URL path.
    #[serde(default)]
    pub url_path: Option<String>,
    /// Global status.
    pub status: ProductStatus,
    /// Global visibility.
    pub visibility: Visibility,
    /// Stores the product is assigned to.
    #[serde(default)]
    pub store_ids: Vec<StoreId>,
    /// Overrides keyed by store id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<StoreId, ProductOverride>,
}

impl ProductRecord {
    /// The product as seen from `store_id`.
    #[must_use]
    pub fn resolve(&self, store_id: StoreId) -> Product {
        let scoped = self.overrides.get(&store_id);
        let pick = |f: fn(&ProductOverride) -> Option<&String>| scoped.and_then(f).cloned();

        Product {
            id: self.id,
            sku: self.sku.clone(),
            name: pick(|o| o.name.as_ref()).unwrap_or_else(|| self.name.clone()),
            url_key: pick(|o| o.url_key.as_ref()).or_else(|| self.url_key.clone()),
            url_path: self.url_path.clone(),
            status: scoped.and_then(|o| o.status).unwrap_or(self.status),
            visibility: scoped.and_then(|o| o.visibility).unwrap_or(self.visibility),
            store_id,
        }
    }
}

/// Serialized snapshot document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    /// Storefronts, including the admin store.
    pub stores: Vec<Storefront>,
    /// Products.
    pub products: Vec<ProductRecord>,
    /// URL rewrite table.
    pub url_rewrites: Vec<UrlRewrite>,
}

/// Snapshot-backed store registry, product source and rewrite store.
#[derive(Debug)]
pub struct SnapshotCatalog {
    path: Option<PathBuf>,
    data: RefCell<CatalogSnapshot>,
}

impl SnapshotCatalog {
    /// Load a snapshot file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Catalog snapshot {} does not exist",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Storage(format!("Failed to read catalog snapshot: {e}")))?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&content)?;
        debug!(
            stores = snapshot.stores.len(),
            products = snapshot.products.len(),
            rewrites = snapshot.url_rewrites.len(),
            "Loaded catalog snapshot from {}",
            path.display()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            data: RefCell::new(snapshot),
        })
    }

    /// Wrap an in-memory snapshot that has no backing file.
    #[must_use]
    pub const fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            path: None,
            data: RefCell::new(snapshot),
        }
    }

    /// Copy of the current document.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.data.borrow().clone()
    }

    /// Current rewrite table.
    #[must_use]
    pub fn url_rewrites(&self) -> Vec<UrlRewrite> {
        self.data.borrow().url_rewrites.clone()
    }

    /// Write the snapshot back to the file it was opened from.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| Error::Storage("Catalog snapshot has no backing file".into()))?;
        self.save_to(path)
    }

    /// Write the snapshot to `path` through a temporary file and a rename.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::Storage(format!("Failed to create snapshot directory: {e}"))
                })?;
            }
        }

        let tmp_path = path.with_extension("json.tmp");
        let tmp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| Error::Storage(format!("Failed to write catalog snapshot: {e}")))?;

        let mut buf = BufWriter::new(tmp);
        serde_json::to_writer_pretty(&mut buf, &*self.data.borrow())?;
        buf.write_all(b"\n")?;
        buf.flush()?;
        let file = buf
            .into_inner()
            .map_err(|e| Error::Storage(format!("Failed to write catalog snapshot: {e}")))?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, path)
            .map_err(|e| Error::Storage(format!("Failed to replace catalog snapshot: {e}")))?;
        Ok(())
    }

    fn has_store(&self, store_id: StoreId) -> bool {
        self.data
            .borrow()
            .stores
            .iter()
            .any(|store| store.id == store_id)
    }
}

impl StoreRegistry for SnapshotCatalog {
    fn stores(&self, with_default: bool) -> Result<Vec<Storefront>> {
        let mut stores: Vec<Storefront> = self
            .data
            .borrow()
            .stores
            .iter()
            .filter(|store| with_default || store.id != ADMIN_STORE_ID)
            .cloned()
            .collect();
        stores.sort_by_key(|store| store.id);
        Ok(stores)
    }
}

impl ProductSource for SnapshotCatalog {
    fn load(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        if !self.has_store(query.store_id) {
            return Err(Error::NotFound(format!(
                "Store with id {} does not exist",
                query.store_id
            )));
        }

        let mut products: Vec<Product> = self
            .data
            .borrow()
            .products
            .iter()
            .filter(|record| record.store_ids.contains(&query.store_id))
            .map(|record| record.resolve(query.store_id))
            .filter(|product| query.accepts(product))
            .collect();
        products.sort_by_key(|product| product.id);
        Ok(products)
    }
}

type Owner = (String, ProductId, StoreId);

fn owner_of(rewrite: &UrlRewrite) -> Owner {
    (
        rewrite.entity_type.clone(),
        rewrite.entity_id,
        rewrite.store_id,
    )
}

impl UrlPersist for SnapshotCatalog {
    fn delete_by_criteria(&self, criteria: &DeleteCriteria) -> Result<()> {
        self.data
            .borrow_mut()
            .url_rewrites
            .retain(|rewrite| !criteria.matches(rewrite));
        Ok(())
    }

    fn replace(&self, rewrites: &RewriteMap) -> Result<()> {
        if rewrites.is_empty() {
            return Ok(());
        }

        let mut data = self.data.borrow_mut();
        let owners: BTreeSet<Owner> = rewrites.values().map(owner_of).collect();

        let mut claimed: HashSet<(StoreId, String)> = HashSet::new();
        for rewrite in rewrites.values() {
            if !claimed.insert((rewrite.store_id, rewrite.request_path.clone())) {
                return Err(Error::UrlConflict {
                    store_id: rewrite.store_id,
                    request_path: rewrite.request_path.clone(),
                    message: "generated twice in the same batch".to_string(),
                });
            }

            let taken = data.url_rewrites.iter().find(|existing| {
                existing.store_id == rewrite.store_id
                    && existing.request_path == rewrite.request_path
                    && !owners.contains(&owner_of(existing))
            });
            if let Some(existing) = taken {
                return Err(Error::UrlConflict {
                    store_id: rewrite.store_id,
                    request_path: rewrite.request_path.clone(),
                    message: format!(
                        "already used by {} {}",
                        existing.entity_type, existing.entity_id
                    ),
                });
            }
        }

        data.url_rewrites.retain(|existing| {
            !(owners.contains(&owner_of(existing))
                && claimed.contains(&(existing.store_id, existing.request_path.clone())))
        });
        data.url_rewrites.extend(rewrites.values().cloned());
        Ok(())
    }
}
