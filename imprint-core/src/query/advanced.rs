//! Filtered, sorted, paginated list results

use super::{Filter, Populate, QueryParams, ResultEnvelope};
use crate::error::{QueryError, Result};
use crate::store::{Collection, Document, FindQuery};
use std::sync::Arc;

/// List executor over one collection with an optional relation
///
/// Holds no per-request state; each call runs
/// filter → project → sort → paginate → expand → execute → envelope.
#[derive(Clone)]
pub struct AdvancedResults {
    collection: Arc<dyn Collection>,
    populate: Option<Populate>,
}

impl std::fmt::Debug for AdvancedResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvancedResults")
            .field("collection", &self.collection.name())
            .field("populate", &self.populate)
            .finish()
    }
}

impl AdvancedResults {
    pub fn new(collection: Arc<dyn Collection>, populate: Option<Populate>) -> Self {
        Self {
            collection,
            populate,
        }
    }

    /// Normalize raw query pairs and execute them
    pub async fn run<K, V>(&self, pairs: &[(K, V)]) -> Result<ResultEnvelope<Document>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = QueryParams::from_pairs(pairs)?;
        self.execute(&params).await
    }

    /// Execute a normalized request
    pub async fn execute(&self, params: &QueryParams) -> Result<ResultEnvelope<Document>> {
        self.execute_scoped(Filter::all(), params).await
    }

    /// Execute with an extra filter the caller cannot override (e.g. one publisher's books)
    pub async fn execute_scoped(
        &self,
        scope: Filter,
        params: &QueryParams,
    ) -> Result<ResultEnvelope<Document>> {
        reject_hidden(self.collection.hidden_fields(), params)?;

        let filter = scope.and(params.filter.clone());
        let window = params.window;

        let mut query = FindQuery::new(filter.clone());
        if let Some(projection) = &params.projection {
            query = query.select(projection.clone());
        }
        let query = query
            .sort(params.sort.clone())
            .skip(usize::try_from(window.start_index()).unwrap_or(usize::MAX))
            .limit(usize::try_from(window.limit).unwrap_or(usize::MAX));

        tracing::debug!(
            collection = self.collection.name(),
            filter = %filter.to_document(),
            page = window.page,
            limit = window.limit,
            "Executing list query"
        );

        let total = self.collection.count(&filter).await?;
        let mut data = self.collection.find(&query).await?;

        if let Some(populate) = &self.populate {
            populate.expand(&mut data).await?;
        }

        Ok(ResultEnvelope::new(data, window.links(total)))
    }
}

/// Hidden fields (and paths below them) may not be filtered or sorted on
fn reject_hidden(hidden: &[&str], params: &QueryParams) -> std::result::Result<(), QueryError> {
    let is_hidden = |field: &str| {
        hidden.iter().any(|h| {
            field
                .strip_prefix(h)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
    };

    let filtered = params.filter.conditions().into_iter().map(|c| c.field.as_str());
    let sorted = params.sort.keys.iter().map(|k| k.field.as_str());
    match filtered.chain(sorted).find(|field| is_hidden(field)) {
        Some(field) => Err(QueryError::InvalidField(field.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImprintError;
    use crate::query::PageLink;
    use crate::store::{CollectionSpec, MemoryCollection};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Value};

    async fn books(count: usize) -> Arc<dyn Collection> {
        let books = MemoryCollection::new(CollectionSpec::new("books"));
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for i in 0..count {
            let created = base + Duration::minutes(i as i64);
            let doc = json!({
                "id": format!("b{i}"),
                "title": format!("Book {i}"),
                "price": (i * 10) as f64,
                "publisher": if i % 2 == 0 { "p-even" } else { "p-odd" },
                "createdAt": created.to_rfc3339(),
            });
            books.insert(doc.as_object().cloned().unwrap()).await.unwrap();
        }
        Arc::new(books)
    }

    fn ids(envelope: &ResultEnvelope<Document>) -> Vec<&str> {
        envelope
            .data
            .iter()
            .map(|d| d["id"].as_str().unwrap())
            .collect()
    }

    async fn accounts() -> Arc<dyn Collection> {
        let users = MemoryCollection::new(CollectionSpec::new("users").hidden("password"));
        for (id, password) in [("u1", "$argon2id$a"), ("u2", "$argon2id$b")] {
            let doc = json!({
                "id": id,
                "name": id,
                "password": password,
                "createdAt": "2024-01-01T00:00:00Z",
            });
            users.insert(doc.as_object().cloned().unwrap()).await.unwrap();
        }
        Arc::new(users)
    }

    #[tokio::test]
    async fn test_hidden_fields_cannot_filter_or_sort() {
        let results = AdvancedResults::new(accounts().await, None);

        for query in [
            [("password[gte]", "$argon2id$b")],
            [("password.hash", "x")],
            [("sort", "-password")],
        ] {
            let err = results.run(&query).await.unwrap_err();
            assert!(
                matches!(err, ImprintError::Query(QueryError::InvalidField(_))),
                "{query:?} -> {err:?}"
            );
        }

        // Visible fields still work, and a field merely sharing the prefix is allowed
        let envelope = results.run(&[("name", "u1"), ("sort", "passwordHint")]).await.unwrap();
        assert_eq!(ids(&envelope), vec!["u1"]);
        assert!(envelope.data[0].get("password").is_none());
    }

    #[tokio::test]
    async fn test_thirty_items_two_pages() {
        let results = AdvancedResults::new(books(30).await, None);

        let first = results.run::<&str, &str>(&[]).await.unwrap();
        assert!(first.success);
        assert_eq!(first.count, 25);
        assert_eq!(first.pagination.next, Some(PageLink { page: 2, limit: 25 }));
        assert_eq!(first.pagination.prev, None);

        let second = results.run(&[("page", "2")]).await.unwrap();
        assert_eq!(second.count, 5);
        assert_eq!(second.pagination.prev, Some(PageLink { page: 1, limit: 25 }));
        assert_eq!(second.pagination.next, None);
    }

    #[tokio::test]
    async fn test_default_order_is_newest_first() {
        let results = AdvancedResults::new(books(3).await, None);
        let envelope = results.run::<&str, &str>(&[]).await.unwrap();
        assert_eq!(ids(&envelope), vec!["b2", "b1", "b0"]);
    }

    #[tokio::test]
    async fn test_total_counts_only_filtered_documents() {
        let results = AdvancedResults::new(books(30).await, None);

        // 15 even-publisher books fit on one page of 25
        let envelope = results.run(&[("publisher", "p-even")]).await.unwrap();
        assert_eq!(envelope.count, 15);
        assert_eq!(envelope.pagination.next, None);

        let envelope = results
            .run(&[("publisher", "p-even"), ("limit", "10")])
            .await
            .unwrap();
        assert_eq!(envelope.count, 10);
        assert_eq!(envelope.pagination.next, Some(PageLink { page: 2, limit: 10 }));
    }

    #[tokio::test]
    async fn test_price_range_and_select() {
        let results = AdvancedResults::new(books(30).await, None);
        let envelope = results
            .run(&[
                ("price[gte]", "100"),
                ("price[lte]", "200"),
                ("select", "title,price"),
                ("sort", "price"),
            ])
            .await
            .unwrap();

        let prices: Vec<f64> = envelope
            .data
            .iter()
            .map(|d| d["price"].as_f64().unwrap())
            .collect();
        assert_eq!(prices, (10..=20).map(|i| (i * 10) as f64).collect::<Vec<_>>());

        for doc in &envelope.data {
            let mut keys: Vec<&str> = doc.keys().map(String::as_str).collect();
            keys.sort();
            assert_eq!(keys, vec!["id", "price", "title"]);
        }
    }

    #[tokio::test]
    async fn test_scope_is_combined_with_criteria() {
        let results = AdvancedResults::new(books(10).await, None);
        let params = QueryParams::from_pairs(&[("price[lt]", "50")]).unwrap();
        let envelope = results
            .execute_scoped(Filter::eq("publisher", "p-odd"), &params)
            .await
            .unwrap();
        assert_eq!(ids(&envelope), vec!["b3", "b1"]);
    }

    #[tokio::test]
    async fn test_populate_does_not_change_counts() {
        let publishers = MemoryCollection::new(CollectionSpec::new("publishers"));
        publishers
            .insert(json!({"id": "p-even", "name": "Even"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        let populate = Populate::belongs_to("publisher", Arc::new(publishers)).select("name");
        let results = AdvancedResults::new(books(4).await, Some(populate));

        let envelope = results.run(&[("limit", "2")]).await.unwrap();
        assert_eq!(envelope.count, 2);
        assert_eq!(envelope.pagination.next, Some(PageLink { page: 2, limit: 2 }));
        // newest first: b3 (odd, unresolved) then b2 (even)
        assert_eq!(envelope.data[0]["publisher"], Value::Null);
        assert_eq!(envelope.data[1]["publisher"], json!({"id": "p-even", "name": "Even"}));
    }

    #[tokio::test]
    async fn test_malformed_filter_fails_request() {
        let results = AdvancedResults::new(books(3).await, None);
        let err = results.run(&[("price[gtee]", "1")]).await.unwrap_err();
        assert!(matches!(err, ImprintError::Query(_)));
        assert!(err.is_client_error());
    }
}
