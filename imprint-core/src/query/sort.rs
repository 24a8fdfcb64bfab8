//! Multi-key result ordering

use super::filter::{compare_values, lookup};
use crate::store::Document;
use serde_json::Value;
use std::cmp::Ordering;

/// Field every stored document carries; the default sort key
pub const CREATED_AT: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Ordered sort keys; the first key has the highest priority
///
/// An empty spec leaves documents in storage order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub keys: Vec<SortKey>,
}

impl SortSpec {
    /// Keep storage order
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Newest documents first
    pub fn newest_first() -> Self {
        Self {
            keys: vec![SortKey::desc(CREATED_AT)],
        }
    }

    /// Parse `title,-price`; a leading `-` sorts that key descending
    ///
    /// Absent or blank input falls back to newest-first.
    pub fn parse(raw: Option<&str>) -> Self {
        let keys: Vec<SortKey> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter_map(|part| match part.strip_prefix('-') {
                Some(field) if !field.is_empty() => Some(SortKey::desc(field)),
                Some(_) => None,
                None => Some(part.trim_start_matches('+'))
                    .filter(|field| !field.is_empty())
                    .map(SortKey::asc),
            })
            .collect();

        if keys.is_empty() {
            Self::newest_first()
        } else {
            Self { keys }
        }
    }

    /// Compare two documents by every key in priority order
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for key in &self.keys {
            let ordering = compare_for_sort(lookup(a, &key.field), lookup(b, &key.field));
            let ordering = match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort
    pub fn apply(&self, docs: &mut [Document]) {
        if !self.keys.is_empty() {
            docs.sort_by(|a, b| self.compare(a, b));
        }
    }
}

/// Total order across value kinds: missing/null < numbers < strings < booleans < others
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = |v: Option<&Value>| match v {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Bool(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    };

    match (a, b) {
        (Some(a), Some(b)) if rank(Some(a)) == rank(Some(b)) => {
            compare_values(a, b).unwrap_or(Ordering::Equal)
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn titles(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d["title"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_parse_sort_keys() {
        let spec = SortSpec::parse(Some("title,-price"));
        assert_eq!(spec.keys, vec![SortKey::asc("title"), SortKey::desc("price")]);
    }

    #[test]
    fn test_missing_or_blank_sort_defaults_to_newest_first() {
        assert_eq!(SortSpec::parse(None), SortSpec::newest_first());
        assert_eq!(SortSpec::parse(Some("")), SortSpec::newest_first());
        assert_eq!(SortSpec::parse(Some(" , -")), SortSpec::newest_first());
    }

    #[test]
    fn test_multi_key_priority() {
        let mut list = docs(vec![
            json!({"title": "b", "price": 10}),
            json!({"title": "a", "price": 10}),
            json!({"title": "c", "price": 20}),
        ]);
        SortSpec::parse(Some("-price,title")).apply(&mut list);
        assert_eq!(titles(&list), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_ties_keep_storage_order() {
        let mut list = docs(vec![
            json!({"title": "first", "price": 5}),
            json!({"title": "second", "price": 5}),
            json!({"title": "third", "price": 5}),
        ]);
        SortSpec::parse(Some("price")).apply(&mut list);
        assert_eq!(titles(&list), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_newest_first_uses_timestamps() {
        let mut list = docs(vec![
            json!({"title": "old", "createdAt": "2024-01-01T00:00:00Z"}),
            json!({"title": "new", "createdAt": "2024-01-01T00:00:00.250Z"}),
            json!({"title": "undated"}),
        ]);
        SortSpec::newest_first().apply(&mut list);
        assert_eq!(titles(&list), vec!["new", "old", "undated"]);
    }
}
