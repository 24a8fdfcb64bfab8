//! Application state

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use imprint_core::{
    Catalog, Database, JwtConfig, LocalStorage, LogMailer, Mailer, StorageProvider, TokenManager,
};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Open the database under `config.data_path` and log outgoing email
    pub async fn new(config: ServerConfig) -> Result<Self> {
        tokio::fs::create_dir_all(config.uploads_path())
            .await
            .with_context(|| format!("Failed to create {}", config.data_path.display()))?;

        let storage = Arc::new(LocalStorage::new(&config.data_path));
        Self::with_storage(config, storage, Arc::new(LogMailer)).await
    }

    /// Build state over any storage provider and mailer
    pub async fn with_storage(
        config: ServerConfig,
        storage: Arc<dyn StorageProvider>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self> {
        let db = Database::open(storage)
            .await
            .context("Failed to open collections")?;
        let tokens = TokenManager::new(JwtConfig::new(
            config.jwt_secret.clone(),
            config.jwt_expire_days,
        ));
        let catalog = Catalog::new(db, tokens, mailer).with_settings(config.catalog_settings());

        Ok(Self {
            catalog,
            config: Arc::new(config),
        })
    }
}
