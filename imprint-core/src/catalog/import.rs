//! Bulk import of raw records (seed data)

use super::{Catalog, UPLOADS_DIR};
use crate::auth::hash_password;
use crate::error::{Result, StoreError};
use crate::store::{from_document, to_document, Document, BOOKS, PUBLISHERS, REVIEWS, USERS};
use crate::types::{validate::slugify, Book, Publisher, Review, User, DEFAULT_PHOTO};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeSet;
use uuid::Uuid;

impl Catalog {
    /// Validate and insert `records` into `collection`
    ///
    /// Records may carry `_id` instead of `id`; missing ids and
    /// timestamps are filled in and plain-text user passwords are hashed.
    /// `on_record` runs after each insert.
    pub async fn import(
        &self,
        collection: &str,
        records: Vec<Value>,
        mut on_record: impl FnMut(),
    ) -> Result<usize> {
        let target = self.db.collection(collection)?;
        let mut rated = BTreeSet::new();
        let mut imported = 0;

        for record in records {
            let Value::Object(mut doc) = record else {
                return Err(StoreError::Corrupt(format!(
                    "{collection} records must be objects"
                ))
                .into());
            };
            fill_identity(&mut doc);

            let doc = match collection {
                USERS => {
                    hash_plain_password(&mut doc)?;
                    let user: User = from_document(doc)?;
                    user.validate()?;
                    to_document(&user)?
                }
                PUBLISHERS => {
                    if let Some(Value::String(name)) = doc.get("name") {
                        let slug = slugify(name);
                        doc.insert("slug".to_string(), Value::String(slug));
                    }
                    doc.entry("photo")
                        .or_insert_with(|| Value::String(DEFAULT_PHOTO.to_string()));
                    let publisher: Publisher = from_document(doc)?;
                    publisher.validate()?;
                    to_document(&publisher)?
                }
                BOOKS => {
                    let book: Book = from_document(doc)?;
                    book.validate()?;
                    to_document(&book)?
                }
                REVIEWS => {
                    let review: Review = from_document(doc)?;
                    review.validate()?;
                    rated.insert(review.publisher.clone());
                    to_document(&review)?
                }
                other => return Err(StoreError::UnknownCollection(other.to_string()).into()),
            };

            target.insert(doc).await?;
            imported += 1;
            on_record();
        }

        for publisher in &rated {
            self.refresh_average_rating(publisher).await?;
        }

        tracing::info!(collection, imported, "Records imported");
        Ok(imported)
    }

    /// Empty every collection and remove uploaded publisher photos
    pub async fn destroy_all(&self) -> Result<Destroyed> {
        let documents = self.db.clear().await?;

        let storage = self.db.storage();
        let mut photos = 0;
        for name in storage.list(UPLOADS_DIR).await? {
            let path = format!("{UPLOADS_DIR}/{name}");
            match storage.delete(&path).await {
                Ok(()) => photos += 1,
                Err(e) => tracing::warn!(path = %path, error = %e, "Failed to remove upload"),
            }
        }

        tracing::info!(documents, photos, "Catalog destroyed");
        Ok(Destroyed { documents, photos })
    }
}

/// What [`Catalog::destroy_all`] removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destroyed {
    pub documents: u64,
    pub photos: usize,
}

fn fill_identity(doc: &mut Document) {
    if !doc.contains_key("id") {
        let id = doc
            .remove("_id")
            .unwrap_or_else(|| Value::String(Uuid::new_v4().to_string()));
        doc.insert("id".to_string(), id);
    }
    doc.entry("createdAt")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
}

fn hash_plain_password(doc: &mut Document) -> Result<()> {
    if let Some(Value::String(password)) = doc.get("password") {
        if !password.starts_with("$argon2") {
            let hash = hash_password(password)?;
            doc.insert("password".to_string(), Value::String(hash));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Destroyed;
    use crate::catalog::testing::fixture;
    use crate::catalog::UPLOADS_DIR;
    use crate::error::ImprintError;
    use crate::query::Filter;
    use serde_json::json;

    #[tokio::test]
    async fn test_import_dependency_chain() {
        let fx = fixture().await;
        let catalog = &fx.catalog;

        let users = vec![
            json!({
                "_id": "u1",
                "name": "Owner",
                "email": "owner@example.com",
                "role": "publisher",
                "password": "123456"
            }),
            json!({
                "_id": "u2",
                "name": "Reader",
                "email": "reader@example.com",
                "password": "123456"
            }),
        ];
        let publishers = vec![json!({
            "_id": "p1",
            "name": "Acme Books",
            "description": "Classics",
            "address": "1 Main St",
            "genres": ["NOVEL"],
            "user": "u1"
        })];
        let books = vec![json!({
            "title": "Dune", "description": "Spice", "writer": "Frank Herbert",
            "price": 10, "publisher": "p1", "user": "u1"
        })];
        let reviews = vec![json!({
            "title": "Great", "text": "Loved it", "rating": 9,
            "publisher": "p1", "user": "u2"
        })];

        let mut ticks = 0;
        assert_eq!(catalog.import("users", users, || ticks += 1).await.unwrap(), 2);
        assert_eq!(ticks, 2);
        catalog.import("publishers", publishers, || {}).await.unwrap();
        catalog.import("books", books, || {}).await.unwrap();
        catalog.import("reviews", reviews, || {}).await.unwrap();

        let publisher = catalog.get_publisher("p1").await.unwrap();
        assert_eq!(publisher.slug, "acme-books");
        assert_eq!(publisher.average_rating, Some(9.0));
        assert!(catalog.login("owner@example.com", "123456").await.is_ok());
        assert_eq!(
            catalog.database().books.count(&Filter::all()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_records() {
        let fx = fixture().await;
        let review = json!({
            "title": "x", "text": "y", "rating": 42, "publisher": "p", "user": "u"
        });
        let err = fx
            .catalog
            .import("reviews", vec![review], || {})
            .await
            .unwrap_err();
        assert!(matches!(err, ImprintError::Validation(_)));

        assert!(fx
            .catalog
            .import("bootcamps", vec![json!({})], || {})
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_destroy_all_removes_documents_and_uploads() {
        let fx = fixture().await;
        let catalog = &fx.catalog;
        let users = vec![json!({
            "_id": "u1", "name": "Owner", "email": "owner@example.com", "password": "123456"
        })];
        catalog.import("users", users, || {}).await.unwrap();

        let storage = catalog.database().storage();
        let photo = format!("{UPLOADS_DIR}/photo_p1.jpg");
        storage.write(&photo, vec![0xff, 0xd8]).await.unwrap();

        let destroyed = catalog.destroy_all().await.unwrap();
        assert_eq!(destroyed, Destroyed { documents: 1, photos: 1 });
        assert!(!storage.exists(&photo).await.unwrap());
        assert_eq!(
            catalog.database().users.count(&Filter::all()).await.unwrap(),
            0
        );
    }
}
