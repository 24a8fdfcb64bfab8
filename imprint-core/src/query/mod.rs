//! Query pipeline for list endpoints
//!
//! Turns free-form query parameters into a filter, projection, sort
//! order and page window, runs them against a [`Collection`], expands
//! relations and wraps the page in a [`ResultEnvelope`].
//!
//! [`Collection`]: crate::store::Collection

mod advanced;
pub mod filter;
mod pagination;
mod params;
mod populate;
mod projection;
mod sort;

pub use advanced::AdvancedResults;
pub use filter::{Condition, Filter, FilterOp};
pub use pagination::{
    PageLink, PageWindow, Pagination, ResultEnvelope, DEFAULT_LIMIT, DEFAULT_PAGE,
};
pub use params::{decode_query, QueryParams, RESERVED_KEYS};
pub use populate::{Populate, RelationKind};
pub use projection::{Projection, IDENTITY_FIELD};
pub use sort::{SortDirection, SortKey, SortSpec, CREATED_AT};
