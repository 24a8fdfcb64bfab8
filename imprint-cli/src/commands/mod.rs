//! CLI command implementations

mod admin;
mod query;
mod seed;

pub use admin::create_admin;
pub use query::query;
pub use seed::{seed_destroy, seed_import};

use anyhow::{Context, Result};
use imprint_core::auth::DEFAULT_EXPIRE_DAYS;
use imprint_core::{Catalog, Database, JwtConfig, LocalStorage, LogMailer, TokenManager};
use std::path::Path;
use std::sync::Arc;

/// Open the catalog stored under `data`
///
/// Offline commands never issue tokens, so the signing secret is a placeholder.
async fn open_catalog(data: &Path) -> Result<Catalog> {
    tokio::fs::create_dir_all(data)
        .await
        .with_context(|| format!("Failed to create data directory: {}", data.display()))?;

    let storage = Arc::new(LocalStorage::new(data));
    let db = Database::open(storage)
        .await
        .with_context(|| format!("Failed to open collections in {}", data.display()))?;
    let tokens = TokenManager::new(JwtConfig::new("imprint-cli", DEFAULT_EXPIRE_DAYS));

    Ok(Catalog::new(db, tokens, Arc::new(LogMailer)))
}
