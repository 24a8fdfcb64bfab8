//! Publisher entity

use super::validate::{self, in_range, max_len, non_empty, optional, required};
use super::Genre;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NAME_MAX: usize = 50;
pub const DESCRIPTION_MAX: usize = 500;
pub const PHONE_MAX: usize = 20;
pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// A publishing house listed in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    pub id: String,

    /// Unique display name
    pub name: String,

    /// URL-friendly form of `name`, recomputed whenever the name changes
    pub slug: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub address: String,

    /// Mean review rating; absent until the first review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,

    pub genres: Vec<Genre>,

    /// File name under the uploads directory
    pub photo: String,

    /// Owning account id
    pub user: String,

    pub created_at: DateTime<Utc>,
}

/// Client-supplied publisher fields, for both creation and partial update
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublisherInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
}

impl Publisher {
    /// Build and validate a new publisher owned by `owner`
    pub fn new(input: PublisherInput, owner: impl Into<String>) -> Result<Self, ValidationError> {
        let name = required("name", input.name)?;
        let publisher = Self {
            id: Uuid::new_v4().to_string(),
            slug: validate::slugify(&name),
            name,
            description: required("description", input.description)?,
            website: optional(input.website),
            phone: optional(input.phone),
            email: optional(input.email),
            address: required("address", input.address)?,
            average_rating: None,
            genres: input.genres.unwrap_or_default(),
            photo: DEFAULT_PHOTO.to_string(),
            user: owner.into(),
            created_at: Utc::now(),
        };
        publisher.validate()?;
        Ok(publisher)
    }

    /// Merge the supplied fields and re-validate
    pub fn apply(&mut self, input: PublisherInput) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(name) = input.name {
            next.name = name.trim().to_string();
            next.slug = validate::slugify(&next.name);
        }
        if let Some(description) = input.description {
            next.description = description.trim().to_string();
        }
        if let Some(address) = input.address {
            next.address = address.trim().to_string();
        }
        if input.website.is_some() {
            next.website = optional(input.website);
        }
        if input.phone.is_some() {
            next.phone = optional(input.phone);
        }
        if input.email.is_some() {
            next.email = optional(input.email);
        }
        if let Some(genres) = input.genres {
            next.genres = genres;
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", &self.name)?;
        max_len("name", &self.name, NAME_MAX)?;
        non_empty("description", &self.description)?;
        max_len("description", &self.description, DESCRIPTION_MAX)?;
        non_empty("address", &self.address)?;

        if let Some(website) = &self.website {
            if !validate::is_url(website) {
                return Err(ValidationError::InvalidFormat("URL with HTTP or HTTPS"));
            }
        }
        if let Some(phone) = &self.phone {
            max_len("phone", phone, PHONE_MAX)?;
        }
        if let Some(email) = &self.email {
            if !validate::is_email(email) {
                return Err(ValidationError::InvalidFormat("email"));
            }
        }
        if let Some(rating) = self.average_rating {
            in_range("averageRating", rating, 1.0, 10.0)?;
        }
        if self.genres.is_empty() {
            return Err(ValidationError::MissingField("genre"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PublisherInput {
        PublisherInput {
            name: Some("  Penguin Books ".into()),
            description: Some("Classic paperbacks".into()),
            website: Some("https://www.penguin.co.uk".into()),
            phone: Some("+44 20 7139 3000".into()),
            email: Some("info@penguin.co.uk".into()),
            address: Some("80 Strand, London".into()),
            genres: Some(vec![Genre::Novel, Genre::Fiction]),
        }
    }

    #[test]
    fn test_new_trims_and_slugs() {
        let publisher = Publisher::new(input(), "u1").unwrap();
        assert_eq!(publisher.name, "Penguin Books");
        assert_eq!(publisher.slug, "penguin-books");
        assert_eq!(publisher.photo, DEFAULT_PHOTO);
        assert_eq!(publisher.user, "u1");
        assert!(publisher.average_rating.is_none());
    }

    #[test]
    fn test_new_requires_fields() {
        let missing_name = PublisherInput {
            name: None,
            ..input()
        };
        assert_eq!(
            Publisher::new(missing_name, "u1").unwrap_err().to_string(),
            "Please add a name"
        );

        let no_genres = PublisherInput {
            genres: Some(vec![]),
            ..input()
        };
        assert!(Publisher::new(no_genres, "u1").is_err());
    }

    #[test]
    fn test_new_rejects_bad_formats() {
        let long_name = PublisherInput {
            name: Some("x".repeat(NAME_MAX + 1)),
            ..input()
        };
        assert_eq!(
            Publisher::new(long_name, "u1").unwrap_err(),
            ValidationError::TooLong {
                field: "name",
                max: NAME_MAX
            }
        );

        let bad_site = PublisherInput {
            website: Some("penguin".into()),
            ..input()
        };
        assert!(Publisher::new(bad_site, "u1").is_err());
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut publisher = Publisher::new(input(), "u1").unwrap();

        let rename = PublisherInput {
            name: Some("Vintage".into()),
            ..Default::default()
        };
        publisher.apply(rename).unwrap();
        assert_eq!(publisher.slug, "vintage");
        assert_eq!(publisher.description, "Classic paperbacks");

        let invalid = PublisherInput {
            name: Some("Bodley Head".into()),
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(publisher.apply(invalid).is_err());
        assert_eq!(publisher.name, "Vintage");
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut publisher = Publisher::new(input(), "u1").unwrap();
        publisher.average_rating = Some(7.5);
        let doc = serde_json::to_value(&publisher).unwrap();
        assert_eq!(doc["averageRating"], 7.5);
        assert!(doc.get("createdAt").is_some());
        assert_eq!(doc["genres"], serde_json::json!(["NOVEL", "FICTION"]));
    }
}
