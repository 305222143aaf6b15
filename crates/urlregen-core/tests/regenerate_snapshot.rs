#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use tempfile::tempdir;
use urlregen_core::{
    CanonicalUrlGenerator, CatalogSnapshot, DeleteCriteria, JournalInvalidator, ProductId,
    ProductOverride, ProductRecord, ProductStatus, ProductUrlRegenerator, RewriteMap,
    SnapshotCatalog, StoreId, StoreSelector, Storefront, UrlPersist, UrlRewrite, Visibility,
    read_journal,
};

fn store(id: StoreId, code: &str) -> Storefront {
    Storefront {
        id,
        code: code.to_string(),
        name: format!("{code} store"),
        is_active: true,
    }
}

fn product(id: ProductId, url_key: &str, store_ids: &[StoreId]) -> ProductRecord {
    ProductRecord {
        id,
        sku: format!("SKU-{id}"),
        name: format!("Product {id}"),
        url_key: Some(url_key.to_string()),
        url_path: None,
        status: ProductStatus::Enabled,
        visibility: Visibility::CatalogSearch,
        store_ids: store_ids.to_vec(),
        overrides: BTreeMap::new(),
    }
}

/// Store 1 sells 101 and 102; store 2 sells both but 102 is disabled there.
fn shop() -> CatalogSnapshot {
    let mut p102 = product(102, "red-mug", &[1, 2]);
    p102.overrides.insert(
        2,
        ProductOverride {
            status: Some(ProductStatus::Disabled),
            ..ProductOverride::default()
        },
    );
    let mut p101 = product(101, "blue-tee", &[1, 2]);
    p101.overrides.insert(
        2,
        ProductOverride {
            url_key: Some("tee-bleu".to_string()),
            ..ProductOverride::default()
        },
    );

    CatalogSnapshot {
        stores: vec![store(0, "admin"), store(1, "default"), store(2, "fr")],
        products: vec![p101, p102, product(103, "green-cap", &[1])],
        url_rewrites: vec![UrlRewrite::product(
            102,
            2,
            "red-mug.html",
            "catalog/product/view/id/102",
        )],
    }
}

fn ids(values: &[ProductId]) -> BTreeSet<ProductId> {
    values.iter().copied().collect()
}

fn paths(catalog: &SnapshotCatalog, store_id: StoreId) -> Vec<String> {
    let mut paths: Vec<String> = catalog
        .url_rewrites()
        .into_iter()
        .filter(|rewrite| rewrite.store_id == store_id)
        .map(|rewrite| rewrite.request_path)
        .collect();
    paths.sort();
    paths
}

#[test]
fn allowlisted_run_across_all_stores() -> Result<()> {
    let dir = tempdir()?;
    let journal_path = dir.path().join("invalidations.jsonl");
    let catalog = SnapshotCatalog::from_snapshot(shop());
    let generator = CanonicalUrlGenerator::default();
    let journal = JournalInvalidator::new(&journal_path);

    let mut regenerator =
        ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, &journal);
    let report = regenerator.execute(&ids(&[101, 102]), StoreSelector::All)?;

    assert_eq!(report.regenerated, 3);
    assert_eq!(regenerator.regenerated_count(), 3);
    assert_eq!(paths(&catalog, 1), vec!["blue-tee.html", "red-mug.html"]);
    // 102 is disabled in store 2, so its stale rewrite is left alone.
    assert_eq!(paths(&catalog, 2), vec!["red-mug.html", "tee-bleu.html"]);
    assert!(paths(&catalog, 0).is_empty());

    let entries = read_journal(&journal_path)?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].tags["cat_p"], ids(&[101, 102]));
    assert_eq!(entries[1].tags["cat_p"], ids(&[101]));
    Ok(())
}

#[test]
fn second_run_produces_the_same_rewrites() -> Result<()> {
    let catalog = SnapshotCatalog::from_snapshot(shop());
    let generator = CanonicalUrlGenerator::default();
    let journal_dir = tempdir()?;
    let journal = JournalInvalidator::new(journal_dir.path().join("j.jsonl"));
    let mut regenerator =
        ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, &journal);

    regenerator.execute(&BTreeSet::new(), StoreSelector::All)?;
    let first = catalog.url_rewrites();
    let second_report = regenerator.execute(&BTreeSet::new(), StoreSelector::All)?;

    let mut before = first;
    let mut after = catalog.url_rewrites();
    before.sort_by(|a, b| (a.store_id, &a.request_path).cmp(&(b.store_id, &b.request_path)));
    after.sort_by(|a, b| (a.store_id, &a.request_path).cmp(&(b.store_id, &b.request_path)));
    assert_eq!(before, after);
    assert_eq!(second_report.regenerated, 4);
    assert!(second_report.conflicts.is_empty());
    Ok(())
}

#[test]
fn colliding_url_key_is_reported_and_run_continues() -> Result<()> {
    let mut snapshot = shop();
    // 104 wants the path 101 already owns in store 1.
    snapshot.products.push(product(104, "blue-tee", &[1]));
    snapshot.products.push(product(105, "yellow-sock", &[1]));
    let catalog = SnapshotCatalog::from_snapshot(snapshot);
    let generator = CanonicalUrlGenerator::default();
    let journal_dir = tempdir()?;
    let journal = JournalInvalidator::new(journal_dir.path().join("j.jsonl"));

    let mut regenerator =
        ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, &journal);
    let report = regenerator.execute(&BTreeSet::new(), StoreSelector::Store(1))?;

    assert_eq!(report.conflicts.len(), 1);
    let conflict = &report.conflicts[0];
    assert_eq!(conflict.product_id, 104);
    assert_eq!(conflict.request_paths, vec!["blue-tee.html"]);
    assert!(conflict.message.contains("already used by product 101"));

    assert_eq!(report.regenerated, 4);
    assert!(paths(&catalog, 1).contains(&"yellow-sock.html".to_string()));
    assert_eq!(report.stores.len(), 1);
    assert_eq!(report.stores[0].conflicts, 1);
    assert_eq!(report.stores[0].products, 5);
    Ok(())
}

#[test]
fn custom_redirects_survive_regeneration() -> Result<()> {
    let mut snapshot = shop();
    let mut redirect = UrlRewrite::product(101, 1, "old-tee.html", "blue-tee.html");
    redirect.redirect_type = 301;
    snapshot.url_rewrites.push(redirect.clone());
    let catalog = SnapshotCatalog::from_snapshot(snapshot);
    let generator = CanonicalUrlGenerator::default();
    let journal_dir = tempdir()?;
    let journal = JournalInvalidator::new(journal_dir.path().join("j.jsonl"));

    let mut regenerator =
        ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, &journal);
    regenerator.execute(&ids(&[101]), StoreSelector::Store(1))?;

    assert!(catalog.url_rewrites().contains(&redirect));
    Ok(())
}

#[test]
fn changed_url_key_replaces_the_old_rewrite_and_persists() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("catalog.json");
    SnapshotCatalog::from_snapshot(shop()).save_to(&path)?;

    let generator = CanonicalUrlGenerator::new("");
    let journal = JournalInvalidator::new(dir.path().join("j.jsonl"));
    {
        let catalog = SnapshotCatalog::open(&path)?;
        let mut regenerator =
            ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, &journal);
        regenerator.execute(&ids(&[103]), StoreSelector::Store(1))?;
        catalog.save()?;
    }

    let mut snapshot = SnapshotCatalog::open(&path)?.snapshot();
    assert!(snapshot.url_rewrites.iter().any(|r| r.request_path == "green-cap"));
    snapshot.products[2].url_key = Some("olive-cap".to_string());
    let catalog = SnapshotCatalog::from_snapshot(snapshot);

    let mut regenerator =
        ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, &journal);
    regenerator.execute(&ids(&[103]), StoreSelector::Store(1))?;

    let owned: Vec<String> = catalog
        .url_rewrites()
        .into_iter()
        .filter(|r| r.entity_id == 103)
        .map(|r| r.request_path)
        .collect();
    assert_eq!(owned, vec!["olive-cap"]);
    Ok(())
}

#[test]
fn unknown_store_fails_without_touching_rewrites() {
    let catalog = SnapshotCatalog::from_snapshot(shop());
    let generator = CanonicalUrlGenerator::default();
    let journal = urlregen_core::LogInvalidator;
    let before = catalog.url_rewrites();

    let mut regenerator =
        ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, &journal);
    let err = regenerator
        .execute(&BTreeSet::new(), StoreSelector::Store(9))
        .unwrap_err();

    assert_eq!(err.category(), "not_found");
    assert_eq!(catalog.url_rewrites(), before);
    assert_eq!(regenerator.regenerated_count(), 0);
}

/// Rewrite store that loses its connection when asked to clean `offline`.
struct FlakyStore<'a> {
    inner: &'a SnapshotCatalog,
    offline: StoreId,
}

impl UrlPersist for FlakyStore<'_> {
    fn delete_by_criteria(&self, criteria: &DeleteCriteria) -> urlregen_core::Result<()> {
        if criteria.store_id == self.offline {
            return Err(urlregen_core::Error::Storage("connection lost".to_string()));
        }
        self.inner.delete_by_criteria(criteria)
    }

    fn replace(&self, rewrites: &RewriteMap) -> urlregen_core::Result<()> {
        self.inner.replace(rewrites)
    }
}

#[test]
fn failure_in_later_store_still_counts_earlier_stores() {
    let catalog = SnapshotCatalog::from_snapshot(shop());
    let persist = FlakyStore {
        inner: &catalog,
        offline: 2,
    };
    let generator = CanonicalUrlGenerator::default();
    let journal = urlregen_core::LogInvalidator;

    let mut regenerator =
        ProductUrlRegenerator::new(&catalog, &catalog, &generator, &persist, &journal);
    let err = regenerator
        .execute(&ids(&[101]), StoreSelector::All)
        .unwrap_err();

    assert_eq!(err.category(), "storage");
    assert_eq!(paths(&catalog, 1), vec!["blue-tee.html"]);
    assert_eq!(regenerator.regenerated_count(), 1);
}

#[test]
fn inactive_store_can_still_be_regenerated() -> Result<()> {
    let mut snapshot = shop();
    let mut outlet = store(3, "outlet");
    outlet.is_active = false;
    snapshot.stores.push(outlet);
    snapshot.products[2].store_ids.push(3);
    let catalog = SnapshotCatalog::from_snapshot(snapshot);
    let generator = CanonicalUrlGenerator::default();
    let journal = urlregen_core::LogInvalidator;

    let mut regenerator =
        ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, &journal);
    let report = regenerator.execute(&BTreeSet::new(), StoreSelector::Store(3))?;

    assert_eq!(report.regenerated, 1);
    assert_eq!(paths(&catalog, 3), vec!["green-cap.html"]);
    Ok(())
}
