//! In-memory collection with write-through JSON snapshots

use super::storage::{StorageProvider, StoreResult};
use super::{document_id, Collection, CollectionSpec, Document, FindQuery};
use crate::error::StoreError;
use crate::query::filter::lookup;
use crate::query::Filter;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Collection held in memory, in insertion order
///
/// When backed by a [`StorageProvider`], every mutation writes the whole
/// collection to `collections/<name>.json` before it becomes visible.
pub struct MemoryCollection {
    spec: CollectionSpec,
    docs: RwLock<Vec<Document>>,
    storage: Option<Arc<dyn StorageProvider>>,
}

impl MemoryCollection {
    /// Unpersisted collection
    pub fn new(spec: CollectionSpec) -> Self {
        Self {
            spec,
            docs: RwLock::new(Vec::new()),
            storage: None,
        }
    }

    /// Open a collection from its snapshot, starting empty when none exists
    pub async fn open(
        spec: CollectionSpec,
        storage: Arc<dyn StorageProvider>,
    ) -> StoreResult<Self> {
        let path = snapshot_path(spec.name);
        let docs = match storage.read_optional(&path).await? {
            Some(bytes) => serde_json::from_slice::<Vec<Document>>(&bytes)
                .map_err(|e| StoreError::Corrupt(format!("{path}: {e}")))?,
            None => Vec::new(),
        };

        tracing::debug!(collection = spec.name, documents = docs.len(), "Opened collection");

        Ok(Self {
            spec,
            docs: RwLock::new(docs),
            storage: Some(storage),
        })
    }

    pub fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    async fn persist(&self, docs: &[Document]) -> StoreResult<()> {
        if let Some(storage) = &self.storage {
            let data = serde_json::to_vec_pretty(docs)?;
            storage.write(&snapshot_path(self.spec.name), data).await?;
        }
        Ok(())
    }

    /// Reject `candidate` if it collides with another document on a unique index
    fn check_unique(&self, docs: &[Document], candidate: &Document) -> StoreResult<()> {
        let candidate_id = document_id(candidate);

        for index in &self.spec.unique {
            let Some(key) = index_key(candidate, index) else {
                continue;
            };
            let collides = docs
                .iter()
                .filter(|doc| document_id(doc) != candidate_id)
                .any(|doc| index_key(doc, index).as_ref() == Some(&key));

            if collides {
                return Err(StoreError::Duplicate {
                    collection: self.spec.name.to_string(),
                    fields: index.join(", "),
                });
            }
        }
        Ok(())
    }

    fn strip_hidden(&self, mut doc: Document) -> Document {
        for field in &self.spec.hidden {
            doc.remove(*field);
        }
        doc
    }
}

fn snapshot_path(name: &str) -> String {
    format!("collections/{name}.json")
}

/// Values of an index's fields; `None` when any is missing or null
fn index_key(doc: &Document, fields: &[&str]) -> Option<Vec<Value>> {
    fields
        .iter()
        .map(|field| lookup(doc, field).filter(|v| !v.is_null()).cloned())
        .collect()
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn hidden_fields(&self) -> &[&'static str] {
        &self.spec.hidden
    }

    async fn find(&self, query: &FindQuery) -> StoreResult<Vec<Document>> {
        let docs = self.docs.read().await;

        let mut matched: Vec<Document> = docs
            .iter()
            .filter(|doc| query.filter.matches(doc))
            .cloned()
            .collect();
        drop(docs);

        query.sort.apply(&mut matched);

        let window = matched
            .into_iter()
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX));

        Ok(window
            .map(|doc| {
                let doc = if query.include_hidden {
                    doc
                } else {
                    self.strip_hidden(doc)
                };
                match &query.projection {
                    Some(projection) => projection.apply(doc),
                    None => doc,
                }
            })
            .collect())
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|doc| document_id(doc) == Some(id)).cloned())
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|doc| filter.matches(doc)).cloned())
    }

    async fn insert(&self, doc: Document) -> StoreResult<Document> {
        let id = document_id(&doc)
            .ok_or_else(|| StoreError::Corrupt("document has no id".to_string()))?
            .to_string();

        let mut docs = self.docs.write().await;
        if docs.iter().any(|existing| document_id(existing) == Some(id.as_str())) {
            return Err(StoreError::Duplicate {
                collection: self.spec.name.to_string(),
                fields: "id".to_string(),
            });
        }
        self.check_unique(&docs, &doc)?;

        let mut next = docs.clone();
        next.push(doc.clone());
        self.persist(&next).await?;
        *docs = next;

        tracing::debug!(collection = self.spec.name, id = %id, "Inserted document");
        Ok(doc)
    }

    async fn replace(&self, id: &str, mut doc: Document) -> StoreResult<Option<Document>> {
        doc.insert("id".to_string(), Value::String(id.to_string()));

        let mut docs = self.docs.write().await;
        let Some(position) = docs.iter().position(|d| document_id(d) == Some(id)) else {
            return Ok(None);
        };
        self.check_unique(&docs, &doc)?;

        let mut next = docs.clone();
        next[position] = doc.clone();
        self.persist(&next).await?;
        *docs = next;

        Ok(Some(doc))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut docs = self.docs.write().await;
        let Some(position) = docs.iter().position(|d| document_id(d) == Some(id)) else {
            return Ok(false);
        };

        let mut next = docs.clone();
        next.remove(position);
        self.persist(&next).await?;
        *docs = next;
        Ok(true)
    }

    async fn delete_many(&self, filter: &Filter) -> StoreResult<u64> {
        let mut docs = self.docs.write().await;
        let next: Vec<Document> = docs.iter().filter(|d| !filter.matches(d)).cloned().collect();
        let removed = (docs.len() - next.len()) as u64;

        if removed > 0 {
            self.persist(&next).await?;
            *docs = next;
        }
        Ok(removed)
    }
}
