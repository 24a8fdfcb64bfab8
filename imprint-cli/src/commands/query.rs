//! Query command implementation

use super::open_catalog;
use anyhow::{Context, Result};
use imprint_core::QueryParams;
use std::path::Path;

/// Run the list pipeline offline and print the envelope as JSON
pub async fn query(data: &Path, collection: &str, query: &str) -> Result<()> {
    let params = QueryParams::parse(query)
        .with_context(|| format!("Invalid query: {query}"))?;

    let catalog = open_catalog(data).await?;
    let envelope = catalog
        .results_for(collection)?
        .execute(&params)
        .await
        .with_context(|| format!("Query against {collection} failed"))?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
