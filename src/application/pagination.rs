//! Offset pagination helpers shared by listing endpoints.

use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Page request as received from the caller; normalise before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageQuery {
    pub page: i64,
    pub limit: i64,
}

impl PageQuery {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(0),
            limit: limit.unwrap_or(0),
        }
    }

    /// Non-positive page becomes 1, non-positive limit becomes 10, and limits
    /// above 100 are clamped.
    pub fn normalize(self) -> Self {
        let page = if self.page <= 0 { DEFAULT_PAGE } else { self.page };
        let limit = if self.limit <= 0 {
            DEFAULT_LIMIT
        } else {
            self.limit.min(MAX_LIMIT)
        };
        Self { page, limit }
    }

    pub fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// A page of rows plus the size of the unpaginated result.
#[derive(Debug, Clone, PartialEq)]
pub struct CountedPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn from_page(page: CountedPage<T>, query: PageQuery) -> Self {
        Self {
            total_pages: total_pages(page.total, query.limit),
            data: page.items,
            page: query.page,
            limit: query.limit,
            total_items: page.total,
        }
    }
}

pub fn total_pages(total: u64, limit: i64) -> u64 {
    match u64::try_from(limit) {
        Ok(limit) if limit > 0 => total.div_ceil(limit),
        _ => 0,
    }
}
