//! Review entity

use super::validate::{in_range, max_len, non_empty, required};
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TITLE_MAX: usize = 100;
pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 10;

/// A user's rating of a publisher; at most one per user and publisher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub title: String,
    pub text: String,
    pub rating: u8,
    pub publisher: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied review fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Review {
    pub fn new(
        input: ReviewInput,
        publisher: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let review = Self {
            id: Uuid::new_v4().to_string(),
            title: required("title", input.title)?,
            text: required("text", input.text)?,
            rating: input.rating.ok_or(ValidationError::MissingField("rating"))?,
            publisher: publisher.into(),
            user: user.into(),
            created_at: Utc::now(),
        };
        review.validate()?;
        Ok(review)
    }

    pub fn apply(&mut self, input: ReviewInput) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(title) = input.title {
            next.title = title.trim().to_string();
        }
        if let Some(text) = input.text {
            next.text = text;
        }
        if let Some(rating) = input.rating {
            next.rating = rating;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("title", &self.title)?;
        max_len("title", &self.title, TITLE_MAX)?;
        non_empty("text", &self.text)?;
        in_range(
            "rating",
            f64::from(self.rating),
            f64::from(RATING_MIN),
            f64::from(RATING_MAX),
        )
    }
}

/// Mean of `ratings`, `None` when empty
pub fn average_rating(ratings: &[u8]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
    Some(f64::from(sum) / ratings.len() as f64)
}
