//! Page<T> — one fetched batch of items plus pagination metadata.

use serde::{Deserialize, Serialize};

/// A single page of results as returned by a backend.
///
/// `page` is the index of the page just fetched. Whether indices start at 0
/// or 1 is a backend policy; end-of-pagination is always `page >= total_pages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    /// Total number of pages, `None` when the backend has not reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    /// Total number of items across all pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page: u32) -> Self {
        Self {
            content,
            page,
            total_pages: None,
            total_size: None,
        }
    }

    /// A page with no content and unknown totals.
    pub fn empty(page: u32) -> Self {
        Self::new(Vec::new(), page)
    }

    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    pub fn with_total_size(mut self, total_size: u64) -> Self {
        self.total_size = Some(total_size);
        self
    }

    /// True only when the total is known and this page reached it.
    pub fn is_last(&self) -> bool {
        self.total_pages.is_some_and(|total| self.page >= total)
    }

    /// True when the total is known and further pages exist.
    ///
    /// An unknown total yields `false`: fetching more needs a known bound.
    pub fn has_more(&self) -> bool {
        matches!(self.total_pages, Some(total) if total > 0 && self.page < total)
    }

    /// Accumulate `next` onto this page.
    ///
    /// Content is concatenated in fetch order; metadata is taken from `next`.
    pub fn append(mut self, next: Page<T>) -> Self {
        self.content.extend(next.content);
        self.page = next.page;
        self.total_pages = next.total_pages.or(self.total_pages);
        self.total_size = next.total_size.or(self.total_size);
        self
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
