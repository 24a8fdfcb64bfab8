//! Seed command implementation

use super::open_catalog;
use anyhow::{bail, Context, Result};
use imprint_core::store::{BOOKS, PUBLISHERS, REVIEWS, USERS};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::Path;

/// Import order: owners before the documents that reference them
const SEED_ORDER: [&str; 4] = [USERS, PUBLISHERS, BOOKS, REVIEWS];

/// Load whichever seed files exist in `dir`
pub async fn seed_import(data: &Path, dir: &Path) -> Result<()> {
    let mut batches = Vec::new();
    for collection in SEED_ORDER {
        let path = dir.join(format!("{collection}.json"));
        if !path.exists() {
            tracing::debug!("No {} to import", path.display());
            continue;
        }
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let records: Vec<Value> = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a JSON array", path.display()))?;
        batches.push((collection, records));
    }

    if batches.is_empty() {
        bail!("No seed files found in {}", dir.display());
    }

    let catalog = open_catalog(data).await?;
    let total: usize = batches.iter().map(|(_, records)| records.len()).sum();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")?
            .progress_chars("##-"),
    );

    let mut imported = 0;
    for (collection, records) in batches {
        pb.set_message(collection);
        let count = catalog
            .import(collection, records, || pb.inc(1))
            .await
            .with_context(|| format!("Failed to import {collection}"))?;
        tracing::info!("Imported {} {}", count, collection);
        imported += count;
    }

    pb.finish_with_message("done");
    println!("Data imported: {imported} documents");

    Ok(())
}

/// Wipe every collection along with uploaded photos
pub async fn seed_destroy(data: &Path) -> Result<()> {
    let catalog = open_catalog(data).await?;
    let destroyed = catalog
        .destroy_all()
        .await
        .context("Failed to clear collections")?;

    println!(
        "Data destroyed: {} documents, {} photos",
        destroyed.documents, destroyed.photos
    );
    Ok(())
}
