//! Catalog services
//!
//! Business rules over the [`Database`]: role and ownership checks,
//! one publisher per non-admin account, one review per account and
//! publisher, cascade deletes and rating upkeep, plus the account flows.

mod accounts;
mod books;
mod import;
mod publishers;
mod reviews;
mod users;

pub use accounts::Session;
pub use import::Destroyed;
pub use publishers::{PhotoUpload, UPLOADS_DIR};

use crate::auth::TokenManager;
use crate::error::{CatalogError, Result, StoreError};
use crate::notify::Mailer;
use crate::query::AdvancedResults;
use crate::store::{
    from_document, to_document, Collection, Database, BOOKS, PUBLISHERS, REVIEWS, USERS,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1_000_000;
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:3000";

/// Tunables that do not belong to any one collection
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Base of links sent by email
    pub public_url: String,
    /// Largest accepted publisher photo
    pub max_upload_bytes: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Entry point for every catalog and account operation
#[derive(Clone)]
pub struct Catalog {
    db: Database,
    tokens: TokenManager,
    mailer: Arc<dyn Mailer>,
    settings: CatalogSettings,
}

impl Catalog {
    pub fn new(db: Database, tokens: TokenManager, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            tokens,
            mailer,
            settings: CatalogSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CatalogSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// The list pipeline a collection's unscoped list route uses
    pub fn results_for(&self, collection: &str) -> Result<AdvancedResults> {
        match collection {
            PUBLISHERS => Ok(self.publisher_results()),
            BOOKS => Ok(self.book_results()),
            REVIEWS => Ok(self.review_results()),
            USERS => Ok(AdvancedResults::new(self.db.users.clone(), None)),
            other => Err(StoreError::UnknownCollection(other.to_string()).into()),
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("tokens", &self.tokens)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Fetch and decode a full document, 404 when absent
async fn load<T: DeserializeOwned>(collection: &Arc<dyn Collection>, id: &str) -> Result<T> {
    let doc = collection
        .get(id)
        .await?
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    Ok(from_document(doc)?)
}

async fn insert<T: Serialize>(collection: &Arc<dyn Collection>, model: &T) -> Result<()> {
    collection.insert(to_document(model)?).await?;
    Ok(())
}

async fn save<T: Serialize>(collection: &Arc<dyn Collection>, id: &str, model: &T) -> Result<()> {
    collection
        .replace(id, to_document(model)?)
        .await?
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::auth::{Actor, JwtConfig};
    use crate::notify::RecordingMailer;
    use crate::types::{Genre, PublisherInput, Role, UserInput};

    pub struct Fixture {
        pub catalog: Catalog,
        pub mailer: Arc<RecordingMailer>,
    }

    pub async fn fixture() -> Fixture {
        let mailer = Arc::new(RecordingMailer::new());
        let db = Database::in_memory().await.unwrap();
        let catalog = Catalog::new(
            db,
            TokenManager::new(JwtConfig::new("test-secret", 30)),
            mailer.clone(),
        );
        Fixture { catalog, mailer }
    }

    pub async fn account(catalog: &Catalog, email: &str, role: Role) -> Actor {
        let admin = Actor::new("bootstrap", Role::Admin);
        let user = catalog
            .create_user(
                &admin,
                UserInput {
                    name: Some(email.split('@').next().unwrap().to_string()),
                    email: Some(email.to_string()),
                    role: Some(role),
                    password: Some("123456".to_string()),
                },
            )
            .await
            .unwrap();
        Actor::from(&user)
    }

    pub fn publisher_input(name: &str) -> PublisherInput {
        PublisherInput {
            name: Some(name.to_string()),
            description: Some(format!("{name} publishes books")),
            address: Some("1 Main St".to_string()),
            genres: Some(vec![Genre::Novel]),
            ..Default::default()
        }
    }
}
