//! The four well-known collections

use super::memory::MemoryCollection;
use super::storage::{MemoryStorage, StorageProvider, StoreResult};
use super::{Collection, CollectionSpec};
use crate::error::StoreError;
use crate::query::Filter;
use std::sync::Arc;

pub const PUBLISHERS: &str = "publishers";
pub const BOOKS: &str = "books";
pub const REVIEWS: &str = "reviews";
pub const USERS: &str = "users";

/// Handles to every collection, sharing one storage provider
#[derive(Clone)]
pub struct Database {
    storage: Arc<dyn StorageProvider>,
    pub publishers: Arc<dyn Collection>,
    pub books: Arc<dyn Collection>,
    pub reviews: Arc<dyn Collection>,
    pub users: Arc<dyn Collection>,
}

impl Database {
    /// Collection definitions with their unique and hidden fields
    pub fn specs() -> Vec<CollectionSpec> {
        vec![
            CollectionSpec::new(PUBLISHERS).unique(&["name"]),
            CollectionSpec::new(BOOKS),
            // One review per user per publisher
            CollectionSpec::new(REVIEWS).unique(&["publisher", "user"]),
            CollectionSpec::new(USERS)
                .unique(&["email"])
                .hidden("password")
                .hidden("resetPasswordToken")
                .hidden("resetPasswordExpire"),
        ]
    }

    /// Open every collection from `storage`
    pub async fn open(storage: Arc<dyn StorageProvider>) -> StoreResult<Self> {
        let mut opened = Vec::new();
        for spec in Self::specs() {
            let collection: Arc<dyn Collection> =
                Arc::new(MemoryCollection::open(spec, storage.clone()).await?);
            opened.push(collection);
        }

        let mut take = |name: &str| -> StoreResult<Arc<dyn Collection>> {
            let index = opened
                .iter()
                .position(|c| c.name() == name)
                .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))?;
            Ok(opened.swap_remove(index))
        };

        let database = Self {
            publishers: take(PUBLISHERS)?,
            books: take(BOOKS)?,
            reviews: take(REVIEWS)?,
            users: take(USERS)?,
            storage,
        };

        tracing::info!("Database opened");
        Ok(database)
    }

    /// Database over fresh in-memory storage
    pub async fn in_memory() -> StoreResult<Self> {
        Self::open(Arc::new(MemoryStorage::new())).await
    }

    /// Storage provider the collections persist through
    pub fn storage(&self) -> &Arc<dyn StorageProvider> {
        &self.storage
    }

    /// Look a collection up by name
    pub fn collection(&self, name: &str) -> StoreResult<Arc<dyn Collection>> {
        match name {
            PUBLISHERS => Ok(self.publishers.clone()),
            BOOKS => Ok(self.books.clone()),
            REVIEWS => Ok(self.reviews.clone()),
            USERS => Ok(self.users.clone()),
            other => Err(StoreError::UnknownCollection(other.to_string())),
        }
    }

    /// All collections in dependency order (owners before dependants)
    pub fn collections(&self) -> [&Arc<dyn Collection>; 4] {
        [&self.users, &self.publishers, &self.books, &self.reviews]
    }

    /// Remove every document from every collection
    pub async fn clear(&self) -> StoreResult<u64> {
        let mut removed = 0;
        for collection in self.collections().into_iter().rev() {
            removed += collection.delete_many(&Filter::all()).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_collections_by_name() {
        let db = Database::in_memory().await.unwrap();
        assert_eq!(db.collection("books").unwrap().name(), BOOKS);
        assert!(matches!(
            db.collection("bootcamps"),
            Err(StoreError::UnknownCollection(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_empties_everything() {
        let db = Database::in_memory().await.unwrap();
        db.books
            .insert(json!({"id": "1"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        db.users
            .insert(json!({"id": "2", "email": "x@y.io"}).as_object().cloned().unwrap())
            .await
            .unwrap();

        assert_eq!(db.clear().await.unwrap(), 2);
        assert_eq!(db.books.count(&Filter::all()).await.unwrap(), 0);
    }
}
