//! Offset pagination primitives for listing endpoints.

use serde::Serialize;

/// Default page size when the caller does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Upper bound on page size to keep responses bounded.
pub const MAX_PER_PAGE: u32 = 100;

/// A validated pagination request. Pages are 1-based.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Build a request from raw query input, clamping out-of-range values
    /// instead of rejecting them.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> usize {
        ((self.page - 1) as usize) * (self.per_page as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of an ordered result set, with the totals the UI needs to
/// render pagination controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
}

impl<T> Page<T> {
    /// Slice an already-ordered full result set into one page.
    pub fn slice(mut all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let last_page = ((total as f64) / (request.per_page() as f64)).ceil().max(1.0) as u32;

        let offset = request.offset().min(all.len());
        let end = (offset + request.per_page() as usize).min(all.len());
        let items = all.drain(offset..end).collect();

        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total,
            last_page,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
        }
    }
}
