//! Listing filters and pagination.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::PostStatus;

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 100;
/// Highest page number accepted. Keeps `offset` inside a Postgres `BIGINT`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PER_PAGE;

/// Where a case-insensitive search term is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Title,
    TitleOrContent,
}

/// Filters for post listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub owner_id: Option<Uuid>,
    pub status: Option<PostStatus>,
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub search_scope: SearchScope,
}

impl PostFilter {
    /// No restriction at all.
    pub fn all() -> Self {
        Self {
            owner_id: None,
            status: None,
            category_id: None,
            search: None,
            search_scope: SearchScope::Title,
        }
    }

    /// Normalized search needle, `None` when blank.
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Clamp raw query values into a usable request.
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
        }
    }

    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);
        assert_eq!(PageRequest::new(Some(3), None).offset(), 20);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let req = PageRequest::new(Some(u64::MAX), Some(MAX_PER_PAGE));
        assert_eq!(req.page, MAX_PAGE);
        assert!(req.offset() <= i64::MAX as u64);
    }

    #[test]
    fn test_last_page() {
        let page: Page<u8> = Page::new(vec![], 21, PageRequest::default());
        assert_eq!(page.last_page(), 3);
        let empty: Page<u8> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(empty.last_page(), 1);
    }

    #[test]
    fn test_needle_normalizes() {
        let mut filter = PostFilter::all();
        filter.search = Some("  HeLLo ".to_string());
        assert_eq!(filter.needle().as_deref(), Some("hello"));
        filter.search = Some("   ".to_string());
        assert_eq!(filter.needle(), None);
    }
}
