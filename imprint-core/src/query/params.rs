//! Query normalization
//!
//! Splits a list request's parameters into presentation controls
//! (`select`, `sort`, `page`, `limit`) and filter criteria.

use super::filter::build_filter;
use super::{Filter, PageWindow, Projection, SortSpec};
use crate::error::QueryError;

/// Keys that control presentation and never become filter criteria
pub const RESERVED_KEYS: [&str; 4] = ["select", "page", "limit", "sort"];

/// A normalized list request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub filter: Filter,
    pub projection: Option<Projection>,
    pub sort: SortSpec,
    pub window: PageWindow,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            filter: Filter::all(),
            projection: None,
            sort: SortSpec::newest_first(),
            window: PageWindow::default(),
        }
    }
}

impl QueryParams {
    /// Normalize decoded `(key, value)` pairs
    ///
    /// Repeated presentation keys keep their last value. Only filter
    /// syntax can fail; everything else falls back to defaults.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, QueryError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let last = |name: &str| {
            pairs
                .iter()
                .rev()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_ref())
        };

        let criteria = pairs
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .filter(|(k, _)| !RESERVED_KEYS.contains(k));

        Ok(Self {
            filter: build_filter(criteria)?,
            projection: last("select").and_then(|raw| {
                Projection::parse(raw).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Ignoring select");
                    None
                })
            }),
            sort: SortSpec::parse(last("sort")),
            window: PageWindow::parse(last("page"), last("limit")),
        })
    }

    /// Normalize a raw, percent-encoded query string (`price[gte]=10&sort=-price`)
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let pairs = decode_query(query)?;
        Self::from_pairs(&pairs)
    }
}

/// Split and percent-decode a query string into pairs
pub fn decode_query(query: &str) -> Result<Vec<(String, String)>, QueryError> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            Ok((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(raw: &str) -> Result<String, QueryError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| QueryError::MalformedKey(raw.to_string()))
}
