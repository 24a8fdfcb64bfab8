//! Relation expansion ("populate")

use super::{Filter, Projection};
use crate::store::{document_id, Collection, Document, FindQuery, StoreResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// How the related documents are found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    /// `path` holds the id of one related document
    BelongsTo,
    /// Related documents point back at this one through `foreign_field`
    HasMany { foreign_field: String },
}

/// Relation descriptor: related collection, join kind and optional field subset
#[derive(Clone)]
pub struct Populate {
    path: String,
    source: Arc<dyn Collection>,
    kind: RelationKind,
    select: Option<Projection>,
}

impl Populate {
    /// Replace the id stored at `path` with the referenced document
    pub fn belongs_to(path: impl Into<String>, source: Arc<dyn Collection>) -> Self {
        Self {
            path: path.into(),
            source,
            kind: RelationKind::BelongsTo,
            select: None,
        }
    }

    /// Attach, under `path`, every document of `source` whose `foreign_field` is this id
    pub fn has_many(
        path: impl Into<String>,
        source: Arc<dyn Collection>,
        foreign_field: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            source,
            kind: RelationKind::HasMany {
                foreign_field: foreign_field.into(),
            },
            select: None,
        }
    }

    /// Restrict related documents to a field list (`"name description"` or `"-phone"`)
    pub fn select(mut self, fields: &str) -> Self {
        match Projection::parse(fields) {
            Ok(select) => self.select = select,
            Err(e) => tracing::warn!(path = %self.path, error = %e, "Ignoring populate select"),
        }
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Inline related documents into `docs`
    ///
    /// One batched lookup per call. Documents whose reference resolves to
    /// nothing get `null` (belongs-to) or an empty list (has-many).
    pub async fn expand(&self, docs: &mut [Document]) -> StoreResult<()> {
        if docs.is_empty() {
            return Ok(());
        }

        match &self.kind {
            RelationKind::BelongsTo => self.expand_belongs_to(docs).await,
            RelationKind::HasMany { foreign_field } => {
                self.expand_has_many(docs, foreign_field).await
            }
        }
    }

    async fn expand_belongs_to(&self, docs: &mut [Document]) -> StoreResult<()> {
        let mut ids: Vec<Value> = Vec::new();
        for doc in docs.iter() {
            if let Some(Value::String(id)) = doc.get(&self.path) {
                let id = Value::String(id.clone());
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }

        let mut query = FindQuery::new(Filter::is_in("id", ids));
        if let Some(select) = &self.select {
            query = query.select(select.clone());
        }
        let related: HashMap<String, Document> = self
            .source
            .find(&query)
            .await?
            .into_iter()
            .filter_map(|doc| Some((document_id(&doc)?.to_string(), doc)))
            .collect();

        for doc in docs.iter_mut() {
            let Some(Value::String(id)) = doc.get(&self.path) else {
                continue;
            };
            let replacement = related
                .get(id)
                .cloned()
                .map(Value::Object)
                .unwrap_or(Value::Null);
            doc.insert(self.path.clone(), replacement);
        }
        Ok(())
    }

    async fn expand_has_many(&self, docs: &mut [Document], foreign_field: &str) -> StoreResult<()> {
        let ids: Vec<Value> = docs
            .iter()
            .filter_map(|doc| document_id(doc).map(|id| Value::String(id.to_string())))
            .collect();

        let mut query = FindQuery::new(Filter::is_in(foreign_field, ids));
        if let Some(select) = &self.select {
            // The back-reference is needed to group results
            let mut select = select.clone();
            select.include(foreign_field);
            query = query.select(select);
        }

        let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
        for related in self.source.find(&query).await? {
            if let Some(Value::String(owner)) = related.get(foreign_field) {
                grouped
                    .entry(owner.clone())
                    .or_default()
                    .push(Value::Object(related));
            }
        }

        for doc in docs.iter_mut() {
            let children = document_id(doc)
                .and_then(|id| grouped.get(id))
                .cloned()
                .unwrap_or_default();
            doc.insert(self.path.clone(), Value::Array(children));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Populate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Populate")
            .field("path", &self.path)
            .field("source", &self.source.name())
            .field("kind", &self.kind)
            .field("select", &self.select)
            .finish()
    }
}
