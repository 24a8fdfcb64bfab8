//! Field selection

use crate::error::QueryError;
use crate::store::Document;

/// Identity field every projected document keeps
pub const IDENTITY_FIELD: &str = "id";

/// A subset of top-level fields to return, or to leave out
///
/// `title,price` keeps only those fields; `-description,-phone` drops them.
/// The identity field is always kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<String>,
    exclude: bool,
}

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut projection = Self {
            fields: Vec::new(),
            exclude: false,
        };
        for field in fields {
            projection.include(field);
        }
        projection
    }

    /// Every field except the named ones
    pub fn excluding<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut projection = Self {
            fields: Vec::new(),
            exclude: true,
        };
        for field in fields {
            let field = field.into();
            if field != IDENTITY_FIELD && !projection.fields.contains(&field) {
                projection.fields.push(field);
            }
        }
        projection
    }

    /// Parse a comma (or space) separated field list; `None` when nothing is named
    ///
    /// A list must either name fields to keep or `-`-prefixed fields to drop.
    pub fn parse(raw: &str) -> Result<Option<Self>, QueryError> {
        let tokens: Vec<&str> = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        let (excluded, included): (Vec<&str>, Vec<&str>) =
            tokens.into_iter().partition(|t| t.starts_with('-'));

        let projection = match (excluded.is_empty(), included.is_empty()) {
            (true, _) => Self::new(included),
            (false, true) => Self::excluding(
                excluded
                    .iter()
                    .map(|t| t.trim_start_matches('-'))
                    .filter(|t| !t.is_empty()),
            ),
            (false, false) => return Err(QueryError::MixedProjection(raw.to_string())),
        };

        Ok((!projection.fields.is_empty()).then_some(projection))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// True when the listed fields are dropped rather than kept
    pub fn is_exclusion(&self) -> bool {
        self.exclude
    }

    /// Make sure a field survives projection
    pub fn include(&mut self, field: impl Into<String>) {
        let field = field.into();
        if self.exclude {
            self.fields.retain(|f| *f != field);
        } else if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }

    /// Apply the selection to a document; its identity always survives
    pub fn apply(&self, mut doc: Document) -> Document {
        doc.retain(|key, _| {
            key == IDENTITY_FIELD || self.fields.iter().any(|f| f == key) != self.exclude
        });
        doc
    }
}
