//! `urlregen regenerate`: rebuild product URL rewrites in one or all storefronts.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;
use urlregen_core::{
    CacheInvalidator, CanonicalUrlGenerator, JournalInvalidator, LogInvalidator, ProductId,
    ProductUrlRegenerator, RegenerateReport,
};

use crate::cli::{Cli, RegenerateArgs};
use crate::error::CliError;
use crate::output::{OutputFormat, print_json};
use crate::utils::resolver::resolve_store;
use crate::utils::settings::{catalog_path, load_config, open_catalog};

/// Run the regeneration and print its outcome.
pub fn execute(cli: &Cli, args: &RegenerateArgs) -> Result<()> {
    let config = load_config(cli)?;
    let path = catalog_path(args.catalog.as_deref(), &config)?;
    let catalog = open_catalog(&path)?;
    let selector = resolve_store(&args.store, &catalog)?;

    let batch_size = match args.batch_size {
        Some(size) => usize::try_from(size).context("--batch-size is too large")?,
        None => config.regenerate.invalidate_batch_size,
    };

    let generator = CanonicalUrlGenerator::new(config.regenerate.url_suffix.clone());
    let journal = args
        .journal
        .clone()
        .or_else(|| config.paths.journal.clone())
        .filter(|_| !args.dry_run)
        .map(JournalInvalidator::new);
    let invalidator: &dyn CacheInvalidator = match &journal {
        Some(journal) => journal,
        None => &LogInvalidator,
    };

    let product_ids: BTreeSet<ProductId> = args.product_ids.iter().copied().collect();
    let mut regenerator =
        ProductUrlRegenerator::new(&catalog, &catalog, &generator, &catalog, invalidator)
            .with_invalidate_batch_size(batch_size);

    let report = regenerator
        .execute(&product_ids, selector)
        .map_err(CliError::from)?;

    if args.dry_run {
        info!("Dry run: {} left untouched", path.display());
    } else {
        catalog
            .save()
            .map_err(CliError::from)
            .with_context(|| format!("Failed to save catalog {}", path.display()))?;
    }

    match args.format.resolve() {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_text(&report, cli.quiet, args.dry_run),
    }
    Ok(())
}

fn print_text(report: &RegenerateReport, quiet: bool, dry_run: bool) {
    if !quiet {
        for store in &report.stores {
            println!(
                "  {} ({}): {} urls from {} products",
                store.name.bold(),
                store.code,
                store.regenerated,
                store.products
            );
        }
    }

    if !report.conflicts.is_empty() {
        eprintln!(
            "{} {} product(s) skipped because of duplicated urls",
            "warning:".yellow().bold(),
            report.conflicts.len()
        );
        for conflict in &report.conflicts {
            eprintln!(
                "  store {}, product {} ({}): {}",
                conflict.store_id,
                conflict.product_id,
                conflict.sku,
                conflict.request_paths.join(", ")
            );
        }
    }

    if report.invalidation.failures > 0 {
        eprintln!(
            "{} {} of {} cache invalidation notification(s) failed to publish",
            "warning:".yellow().bold(),
            report.invalidation.failures,
            report.invalidation.flushes
        );
    }

    let suffix = if dry_run { " (dry run)" } else { "" };
    println!(
        "Finished regenerating. Regenerated {} urls{suffix}",
        report.regenerated
    );
}
