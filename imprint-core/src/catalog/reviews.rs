use super::{load, save, Catalog};
use crate::auth::{authorize, ensure_owner, Actor};
use crate::error::{CatalogError, Result, StoreError};
use crate::query::{AdvancedResults, Filter, Populate, QueryParams, ResultEnvelope};
use crate::store::{to_document, Document, FindQuery};
use crate::types::{average_rating, Publisher, Review, ReviewInput, Role};
use serde_json::Value;

const REVIEW_ROLES: [Role; 2] = [Role::User, Role::Admin];

impl Catalog {
    pub(super) fn review_results(&self) -> AdvancedResults {
        let publisher = Populate::belongs_to("publisher", self.db.publishers.clone())
            .select("name description");
        AdvancedResults::new(self.db.reviews.clone(), Some(publisher))
    }

    pub async fn list_reviews(&self, params: &QueryParams) -> Result<ResultEnvelope<Document>> {
        self.review_results().execute(params).await
    }

    pub async fn list_publisher_reviews(
        &self,
        publisher_id: &str,
        params: &QueryParams,
    ) -> Result<ResultEnvelope<Document>> {
        let _: Publisher = load(&self.db.publishers, publisher_id).await?;
        self.review_results()
            .execute_scoped(Filter::eq("publisher", publisher_id), params)
            .await
    }

    pub async fn get_review(&self, id: &str) -> Result<Review> {
        load(&self.db.reviews, id).await
    }

    /// Review a publisher; each account may review a publisher once
    pub async fn create_review(
        &self,
        actor: &Actor,
        publisher_id: &str,
        input: ReviewInput,
    ) -> Result<Review> {
        authorize(actor, &REVIEW_ROLES)?;
        let publisher: Publisher = load(&self.db.publishers, publisher_id).await?;

        let review = Review::new(input, publisher.id.clone(), actor.id.clone())?;
        match self.db.reviews.insert(to_document(&review)?).await {
            Ok(_) => {}
            Err(StoreError::Duplicate { .. }) => {
                return Err(CatalogError::Conflict(format!(
                    "User {} has already reviewed publisher {}",
                    actor.id, publisher.id
                ))
                .into());
            }
            Err(e) => return Err(e.into()),
        }

        self.refresh_average_rating(&publisher.id).await?;
        tracing::info!(id = %review.id, publisher = %publisher.id, "Review created");
        Ok(review)
    }

    pub async fn update_review(
        &self,
        actor: &Actor,
        id: &str,
        input: ReviewInput,
    ) -> Result<Review> {
        authorize(actor, &REVIEW_ROLES)?;
        let mut review: Review = load(&self.db.reviews, id).await?;
        ensure_owner(actor, &review.user, "update this review")?;

        review.apply(input)?;
        save(&self.db.reviews, id, &review).await?;
        self.refresh_average_rating(&review.publisher).await?;
        Ok(review)
    }

    pub async fn delete_review(&self, actor: &Actor, id: &str) -> Result<()> {
        authorize(actor, &REVIEW_ROLES)?;
        let review: Review = load(&self.db.reviews, id).await?;
        ensure_owner(actor, &review.user, "delete this review")?;

        self.db.reviews.delete(id).await?;
        self.refresh_average_rating(&review.publisher).await?;
        tracing::info!(id = %id, "Review deleted");
        Ok(())
    }

    /// Recompute a publisher's `averageRating` from its remaining reviews
    pub async fn refresh_average_rating(&self, publisher_id: &str) -> Result<Option<f64>> {
        let query = FindQuery::new(Filter::eq("publisher", publisher_id));
        let ratings: Vec<u8> = self
            .db
            .reviews
            .find(&query)
            .await?
            .iter()
            .filter_map(|doc| doc.get("rating").and_then(Value::as_u64))
            .filter_map(|rating| u8::try_from(rating).ok())
            .collect();
        let average = average_rating(&ratings);

        let Some(mut doc) = self.db.publishers.get(publisher_id).await? else {
            return Ok(average);
        };
        match average.and_then(serde_json::Number::from_f64) {
            Some(value) => doc.insert("averageRating".to_string(), Value::Number(value)),
            None => doc.remove("averageRating"),
        };
        self.db.publishers.replace(publisher_id, doc).await?;

        tracing::debug!(publisher = %publisher_id, ?average, "Average rating refreshed");
        Ok(average)
    }
}
