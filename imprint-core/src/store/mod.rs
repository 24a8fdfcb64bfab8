//! Document store
//!
//! Documents are JSON objects carrying a string `id` and a `createdAt`
//! timestamp. A [`Collection`] is the queryable abstraction the query
//! pipeline runs against; [`MemoryCollection`] is the bundled engine.

mod database;
mod memory;
mod storage;

pub use database::{Database, BOOKS, PUBLISHERS, REVIEWS, USERS};
pub use memory::MemoryCollection;
pub use storage::{LocalStorage, MemoryStorage, StorageProvider, StoreResult};

use crate::error::StoreError;
use crate::query::{Filter, Projection, SortSpec};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A stored JSON document
pub type Document = Map<String, Value>;

/// A find request: filter, projection, order and window
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Filter,
    pub projection: Option<Projection>,
    pub sort: SortSpec,
    pub skip: usize,
    pub limit: Option<usize>,
    /// Return fields the collection normally hides
    pub include_hidden: bool,
}

impl FindQuery {
    /// Match `filter`, in storage order, without a window
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn include_hidden(mut self) -> Self {
        self.include_hidden = true;
        self
    }
}

/// Static description of a collection
#[derive(Debug, Clone)]
pub struct CollectionSpec {
    pub name: &'static str,
    /// Each entry is a (possibly compound) unique index
    pub unique: Vec<Vec<&'static str>>,
    /// Fields stripped from query results unless explicitly requested
    pub hidden: Vec<&'static str>,
}

impl CollectionSpec {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            unique: Vec::new(),
            hidden: Vec::new(),
        }
    }

    pub fn unique(mut self, fields: &[&'static str]) -> Self {
        self.unique.push(fields.to_vec());
        self
    }

    pub fn hidden(mut self, field: &'static str) -> Self {
        self.hidden.push(field);
        self
    }
}

/// Queryable collection of documents
#[async_trait]
pub trait Collection: Send + Sync {
    /// Collection name
    fn name(&self) -> &str;

    /// Fields `find` strips unless asked; they cannot drive a list query
    fn hidden_fields(&self) -> &[&'static str] {
        &[]
    }

    /// Filter, sort, window and project matching documents
    async fn find(&self, query: &FindQuery) -> StoreResult<Vec<Document>>;

    /// Count documents matching `filter`, ignoring any window
    async fn count(&self, filter: &Filter) -> StoreResult<u64>;

    /// Fetch a full document by id
    async fn get(&self, id: &str) -> StoreResult<Option<Document>>;

    /// First full document matching `filter` in storage order
    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>>;

    /// Insert a new document; it must already carry an `id`
    async fn insert(&self, doc: Document) -> StoreResult<Document>;

    /// Replace the document with the given id, returning the stored version
    async fn replace(&self, id: &str, doc: Document) -> StoreResult<Option<Document>>;

    /// Delete by id; `false` when nothing was removed
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Delete every document matching `filter`, returning how many went
    async fn delete_many(&self, filter: &Filter) -> StoreResult<u64>;
}

/// Serialize a typed model into a document
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Corrupt(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Deserialize a document into a typed model
pub fn from_document<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// The `id` of a document, if it has one
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}
