//! Book entity

use super::validate::{non_empty, required};
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A title sold by a publisher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub description: String,
    pub writer: String,
    pub price: f64,
    /// Publisher id
    pub publisher: String,
    /// Owning account id
    pub user: String,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied book fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub writer: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl Book {
    pub fn new(
        input: BookInput,
        publisher: impl Into<String>,
        owner: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let book = Self {
            id: Uuid::new_v4().to_string(),
            title: required("title", input.title)?,
            description: required("description", input.description)?,
            writer: required("writer", input.writer)?,
            price: input.price.ok_or(ValidationError::MissingField("price"))?,
            publisher: publisher.into(),
            user: owner.into(),
            created_at: Utc::now(),
        };
        book.validate()?;
        Ok(book)
    }

    /// Merge the supplied fields and re-validate
    pub fn apply(&mut self, input: BookInput) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(title) = input.title {
            next.title = title.trim().to_string();
        }
        if let Some(description) = input.description {
            next.description = description;
        }
        if let Some(writer) = input.writer {
            next.writer = writer;
        }
        if let Some(price) = input.price {
            next.price = price;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("title", &self.title)?;
        non_empty("description", &self.description)?;
        non_empty("writer", &self.writer)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::Rejected(
                "Price can not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
