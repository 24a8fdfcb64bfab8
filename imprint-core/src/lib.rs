//! Imprint Core Library
//!
//! This crate provides the document store, the list query pipeline and the
//! catalog services behind the Imprint publisher directory. Every list
//! endpoint goes through the same pipeline: query parameters are turned
//! into a filter, projection, sort order and page window, executed against
//! a collection, related documents are expanded, and the page is wrapped in
//! a result envelope with pagination links.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod notify;
pub mod query;
pub mod store;
pub mod types;

pub use auth::{Actor, JwtConfig, TokenManager};
pub use catalog::{Catalog, CatalogSettings, PhotoUpload, Session};
pub use error::{
    AuthError, CatalogError, ImprintError, QueryError, Result, StoreError, ValidationError,
};
pub use notify::{Email, LogMailer, Mailer, RecordingMailer};
pub use query::{AdvancedResults, Filter, Populate, QueryParams, ResultEnvelope};
pub use store::{Collection, Database, Document, LocalStorage, MemoryStorage, StorageProvider};
pub use types::{
    Book, BookInput, Genre, Publisher, PublisherInput, Review, ReviewInput, Role, User, UserInput,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_over_fresh_database() {
        let db = Database::in_memory().await.unwrap();
        let catalog = Catalog::new(
            db,
            TokenManager::new(JwtConfig::new("secret", 1)),
            std::sync::Arc::new(LogMailer),
        );
        let envelope = catalog.list_books(&QueryParams::default()).await.unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.count, 0);
    }
}
