//! Page windows and the list response envelope

use serde::{Deserialize, Serialize};

/// Page used when `page` is absent or not a positive integer
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when `limit` is absent or not a positive integer
pub const DEFAULT_LIMIT: u64 = 25;

/// A 1-indexed page of `limit` items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageWindow {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Build a window from raw `page`/`limit` parameters, defaulting silently
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Index of the first item on this page
    pub fn start_index(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Exclusive index one past the last item on this page
    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }

    /// Neighbouring page descriptors given the filtered total
    pub fn links(&self, total: u64) -> Pagination {
        Pagination {
            next: (self.end_index() < total).then(|| PageLink {
                page: self.page + 1,
                limit: self.limit,
            }),
            prev: (self.start_index() > 0).then(|| PageLink {
                page: self.page - 1,
                limit: self.limit,
            }),
        }
    }
}

/// Leading decimal digits, so `2abc` reads as 2 and `10.5` as 10
fn parse_positive(raw: Option<&str>) -> Option<u64> {
    let raw = raw?.trim_start();
    let end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    raw[..end].parse::<u64>().ok().filter(|n| *n > 0)
}

/// `{page, limit}` pointer to a neighbouring page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

/// Neighbouring pages; absent at the respective boundary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

/// Standard list response wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    pub success: bool,
    /// Items on this page, not the total
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<T>,
}

impl<T> ResultEnvelope<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination,
            data,
        }
    }
}
