//! Server configuration from the environment

use anyhow::{Context, Result};
use imprint_core::auth::DEFAULT_EXPIRE_DAYS;
use imprint_core::catalog::{CatalogSettings, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PUBLIC_URL};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Settings read once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root of collection snapshots and uploads
    pub data_path: PathBuf,
    pub addr: SocketAddr,
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub cookie_expire_days: i64,
    pub max_upload_bytes: usize,
    /// `*`, a comma-separated origin list, or unset for localhost origins
    pub cors_origins: Option<String>,
    /// Base of links sent by email
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./imprint_data"),
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            jwt_secret: uuid::Uuid::new_v4().simple().to_string(),
            jwt_expire_days: DEFAULT_EXPIRE_DAYS,
            cookie_expire_days: DEFAULT_EXPIRE_DAYS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origins: None,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `IMPRINT_*` variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let jwt_secret = match std::env::var("IMPRINT_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("IMPRINT_JWT_SECRET not set; tokens will not survive a restart");
                defaults.jwt_secret
            }
        };
        let addr: SocketAddr = env_or("IMPRINT_ADDR", defaults.addr)?;

        Ok(Self {
            data_path: env_or("IMPRINT_DATA_PATH", defaults.data_path)?,
            public_url: std::env::var("IMPRINT_PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://{addr}")),
            addr,
            jwt_secret,
            jwt_expire_days: env_or("IMPRINT_JWT_EXPIRE_DAYS", defaults.jwt_expire_days)?,
            cookie_expire_days: env_or("IMPRINT_COOKIE_EXPIRE_DAYS", defaults.cookie_expire_days)?,
            max_upload_bytes: env_or("IMPRINT_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            cors_origins: std::env::var("IMPRINT_CORS_ORIGINS").ok(),
        })
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.data_path.join(imprint_core::catalog::UPLOADS_DIR)
    }

    pub fn catalog_settings(&self) -> CatalogSettings {
        CatalogSettings {
            public_url: self.public_url.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw}")),
        _ => Ok(default),
    }
}
