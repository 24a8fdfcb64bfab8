use super::{insert, load, save, Catalog};
use crate::auth::{authorize, ensure_owner, Actor};
use crate::error::{CatalogError, Result, ValidationError};
use crate::query::{AdvancedResults, Filter, Populate, QueryParams, ResultEnvelope};
use crate::store::Document;
use crate::types::{Publisher, PublisherInput, Role, DEFAULT_PHOTO};
use std::path::Path;

/// Directory, relative to the storage root, that holds uploaded photos
pub const UPLOADS_DIR: &str = "uploads";

/// An uploaded publisher photo
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Name the client gave the file; only its extension is kept
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

const PUBLISHER_ROLES: [Role; 2] = [Role::Publisher, Role::Admin];

impl Catalog {
    pub(super) fn publisher_results(&self) -> AdvancedResults {
        let books = Populate::has_many("books", self.db.books.clone(), "publisher").select("title");
        AdvancedResults::new(self.db.publishers.clone(), Some(books))
    }

    /// Publishers with the titles of their books
    pub async fn list_publishers(&self, params: &QueryParams) -> Result<ResultEnvelope<Document>> {
        self.publisher_results().execute(params).await
    }

    pub async fn get_publisher(&self, id: &str) -> Result<Publisher> {
        load(&self.db.publishers, id).await
    }

    /// Create a publisher owned by the actor; non-admins may own only one
    pub async fn create_publisher(
        &self,
        actor: &Actor,
        input: PublisherInput,
    ) -> Result<Publisher> {
        authorize(actor, &PUBLISHER_ROLES)?;

        if !actor.is_admin() {
            let existing = self
                .db
                .publishers
                .find_one(&Filter::eq("user", actor.id.as_str()))
                .await?;
            if existing.is_some() {
                return Err(CatalogError::Conflict(format!(
                    "The user with id of {} has already published a publisher",
                    actor.id
                ))
                .into());
            }
        }

        let publisher = Publisher::new(input, actor.id.clone())?;
        insert(&self.db.publishers, &publisher).await?;

        tracing::info!(id = %publisher.id, name = %publisher.name, "Publisher created");
        Ok(publisher)
    }

    pub async fn update_publisher(
        &self,
        actor: &Actor,
        id: &str,
        input: PublisherInput,
    ) -> Result<Publisher> {
        authorize(actor, &PUBLISHER_ROLES)?;
        let mut publisher: Publisher = load(&self.db.publishers, id).await?;
        ensure_owner(actor, &publisher.user, "update this publisher")?;

        publisher.apply(input)?;
        save(&self.db.publishers, id, &publisher).await?;
        Ok(publisher)
    }

    /// Delete a publisher together with its books and reviews
    pub async fn delete_publisher(&self, actor: &Actor, id: &str) -> Result<()> {
        authorize(actor, &PUBLISHER_ROLES)?;
        let publisher: Publisher = load(&self.db.publishers, id).await?;
        ensure_owner(actor, &publisher.user, "delete this publisher")?;

        let owned = Filter::eq("publisher", id);
        let books = self.db.books.delete_many(&owned).await?;
        let reviews = self.db.reviews.delete_many(&owned).await?;
        self.db.publishers.delete(id).await?;

        if publisher.photo != DEFAULT_PHOTO {
            let path = format!("{UPLOADS_DIR}/{}", publisher.photo);
            if let Err(e) = self.db.storage().delete(&path).await {
                tracing::warn!(path = %path, error = %e, "Failed to remove publisher photo");
            }
        }

        tracing::info!(id = %id, books, reviews, "Publisher deleted");
        Ok(())
    }

    /// Store an image as the publisher's photo, returning its file name
    pub async fn set_publisher_photo(
        &self,
        actor: &Actor,
        id: &str,
        upload: PhotoUpload,
    ) -> Result<String> {
        authorize(actor, &PUBLISHER_ROLES)?;
        let mut publisher: Publisher = load(&self.db.publishers, id).await?;
        ensure_owner(actor, &publisher.user, "update this publisher")?;

        if upload.bytes.is_empty() {
            return Err(ValidationError::Rejected("Please upload a file".to_string()).into());
        }
        if !upload.content_type.starts_with("image") {
            return Err(ValidationError::Rejected("Please upload an image file".to_string()).into());
        }
        let max = self.settings.max_upload_bytes;
        if upload.bytes.len() > max {
            return Err(ValidationError::Rejected(format!(
                "Please upload an image less than {max} bytes"
            ))
            .into());
        }

        let file_name = match Path::new(&upload.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(ext) => format!("photo_{}.{}", publisher.id, ext.to_lowercase()),
            None => format!("photo_{}", publisher.id),
        };
        self.db
            .storage()
            .write(&format!("{UPLOADS_DIR}/{file_name}"), upload.bytes)
            .await?;

        publisher.photo = file_name.clone();
        save(&self.db.publishers, id, &publisher).await?;

        tracing::info!(id = %id, photo = %file_name, "Publisher photo updated");
        Ok(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{account, fixture, publisher_input};
    use crate::error::{AuthError, ImprintError};
    use crate::types::{BookInput, ReviewInput};

    #[tokio::test]
    async fn test_results_for_collection_names() {
        let fx = fixture().await;
        let owner = account(&fx.catalog, "owner@example.com", Role::Publisher).await;
        fx.catalog
            .create_publisher(&owner, publisher_input("Acme"))
            .await
            .unwrap();

        let envelope = fx
            .catalog
            .results_for("publishers")
            .unwrap()
            .run(&[("select", "name")])
            .await
            .unwrap();
        assert_eq!(envelope.count, 1);
        assert_eq!(envelope.data[0]["name"], "Acme");

        let users = fx.catalog.results_for("users").unwrap();
        let envelope = users.run::<&str, &str>(&[]).await.unwrap();
        assert!(envelope.data.iter().all(|u| u.get("password").is_none()));

        assert!(fx.catalog.results_for("authors").is_err());
    }

    #[tokio::test]
    async fn test_one_publisher_per_account() {
        let fx = fixture().await;
        let owner = account(&fx.catalog, "owner@example.com", Role::Publisher).await;

        fx.catalog
            .create_publisher(&owner, publisher_input("Acme"))
            .await
            .unwrap();
        let err = fx
            .catalog
            .create_publisher(&owner, publisher_input("Acme Two"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImprintError::Catalog(CatalogError::Conflict(_))));

        let admin = account(&fx.catalog, "admin@example.com", Role::Admin).await;
        fx.catalog
            .create_publisher(&admin, publisher_input("House One"))
            .await
            .unwrap();
        fx.catalog
            .create_publisher(&admin, publisher_input("House Two"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_readers_cannot_create() {
        let fx = fixture().await;
        let reader = account(&fx.catalog, "reader@example.com", Role::User).await;
        let err = fx
            .catalog
            .create_publisher(&reader, publisher_input("Acme"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImprintError::Auth(AuthError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_updates() {
        let fx = fixture().await;
        let owner = account(&fx.catalog, "owner@example.com", Role::Publisher).await;
        let rival = account(&fx.catalog, "rival@example.com", Role::Publisher).await;
        let admin = account(&fx.catalog, "admin@example.com", Role::Admin).await;
        let publisher = fx
            .catalog
            .create_publisher(&owner, publisher_input("Acme"))
            .await
            .unwrap();

        let rename = |name: &str| PublisherInput {
            name: Some(name.to_string()),
            ..Default::default()
        };
        assert!(fx
            .catalog
            .update_publisher(&rival, &publisher.id, rename("Stolen"))
            .await
            .is_err());

        let updated = fx
            .catalog
            .update_publisher(&admin, &publisher.id, rename("Acme Press"))
            .await
            .unwrap();
        assert_eq!(updated.slug, "acme-press");
        assert_eq!(fx.catalog.get_publisher(&publisher.id).await.unwrap().name, "Acme Press");
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let fx = fixture().await;
        let owner = account(&fx.catalog, "owner@example.com", Role::Publisher).await;
        let reader = account(&fx.catalog, "reader@example.com", Role::User).await;
        let publisher = fx
            .catalog
            .create_publisher(&owner, publisher_input("Acme"))
            .await
            .unwrap();
        let book = fx
            .catalog
            .create_book(
                &owner,
                &publisher.id,
                BookInput {
                    title: Some("Dune".into()),
                    description: Some("Spice".into()),
                    writer: Some("Frank Herbert".into()),
                    price: Some(10.0),
                },
            )
            .await
            .unwrap();
        fx.catalog
            .create_review(
                &reader,
                &publisher.id,
                ReviewInput {
                    title: Some("Good".into()),
                    text: Some("Nice".into()),
                    rating: Some(8),
                },
            )
            .await
            .unwrap();

        fx.catalog.delete_publisher(&owner, &publisher.id).await.unwrap();

        assert!(fx.catalog.get_book(&book.id).await.is_err());
        let db = fx.catalog.database();
        assert_eq!(db.reviews.count(&Filter::all()).await.unwrap(), 0);
        assert!(matches!(
            fx.catalog.get_publisher(&publisher.id).await.unwrap_err(),
            ImprintError::Catalog(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_reverse_populates_titles() {
        let fx = fixture().await;
        let owner = account(&fx.catalog, "owner@example.com", Role::Publisher).await;
        let publisher = fx
            .catalog
            .create_publisher(&owner, publisher_input("Acme"))
            .await
            .unwrap();
        fx.catalog
            .create_book(
                &owner,
                &publisher.id,
                BookInput {
                    title: Some("Dune".into()),
                    description: Some("Spice".into()),
                    writer: Some("Frank Herbert".into()),
                    price: Some(10.0),
                },
            )
            .await
            .unwrap();

        let envelope = fx
            .catalog
            .list_publishers(&QueryParams::default())
            .await
            .unwrap();
        assert_eq!(envelope.count, 1);
        let books = envelope.data[0]["books"].as_array().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0]["title"], "Dune");
        assert!(books[0].get("price").is_none());
    }

    #[tokio::test]
    async fn test_photo_upload_rules() {
        let fx = fixture().await;
        let owner = account(&fx.catalog, "owner@example.com", Role::Publisher).await;
        let publisher = fx
            .catalog
            .create_publisher(&owner, publisher_input("Acme"))
            .await
            .unwrap();

        let text = PhotoUpload {
            file_name: "notes.txt".into(),
            content_type: "text/plain".into(),
            bytes: b"hello".to_vec(),
        };
        assert!(matches!(
            fx.catalog
                .set_publisher_photo(&owner, &publisher.id, text)
                .await
                .unwrap_err(),
            ImprintError::Validation(_)
        ));

        let huge = PhotoUpload {
            file_name: "big.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; fx.catalog.settings().max_upload_bytes + 1],
        };
        assert!(fx
            .catalog
            .set_publisher_photo(&owner, &publisher.id, huge)
            .await
            .is_err());

        let photo = PhotoUpload {
            file_name: "logo.PNG".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        let name = fx
            .catalog
            .set_publisher_photo(&owner, &publisher.id, photo)
            .await
            .unwrap();
        assert_eq!(name, format!("photo_{}.png", publisher.id));
        assert_eq!(fx.catalog.get_publisher(&publisher.id).await.unwrap().photo, name);

        let stored = fx
            .catalog
            .database()
            .storage()
            .read(&format!("{UPLOADS_DIR}/{name}"))
            .await
            .unwrap();
        assert_eq!(stored, vec![1, 2, 3]);
    }
}
