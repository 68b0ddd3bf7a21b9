//! Page windows and result shaping.

use serde::{Deserialize, Serialize};

/// A zero-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page_number: u64,
    page_size: u64,
}

impl PageRequest {
    #[must_use]
    pub fn new(page_number: u64, page_size: u64) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    #[must_use]
    pub fn page_number(self) -> u64 {
        self.page_number
    }

    #[must_use]
    pub fn page_size(self) -> u64 {
        self.page_size
    }

    /// Rows skipped before the window.
    #[must_use]
    pub fn offset(self) -> u64 {
        self.page_number * self.page_size
    }

    /// One past the last row of the window, for maximum-row-number
    /// handlers.
    #[must_use]
    pub fn offset_end(self) -> u64 {
        self.offset() + self.page_size
    }

    #[must_use]
    pub fn has_previous(self) -> bool {
        self.page_number > 0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self {
            page_number: self.page_number + 1,
            page_size: self.page_size,
        }
    }
}

/// Total element count for a page, when the page content alone reveals it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Total {
    Exact(u64),
    /// The content is consistent with more rows existing; a count query is
    /// needed.
    Unknown,
}

/// Derives the total element count from a page's content where possible,
/// sparing the count query.
///
/// A partially-filled page pins the total at its own end. A full page (or
/// an empty one past the first) says nothing about what lies beyond.
#[must_use]
pub fn calculate_total(page: PageRequest, returned: u64) -> Total {
    if page.has_previous() {
        if returned == 0 || returned == page.page_size() {
            return Total::Unknown;
        }
        return Total::Exact(page.offset() + returned);
    }
    if returned < page.page_size() {
        Total::Exact(returned)
    } else {
        Total::Unknown
    }
}

/// A window of results that knows whether a next page exists, built from an
/// over-fetched row set (`page_size + 1` requested).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    pub content: Vec<T>,
    pub page: PageRequest,
    pub has_next: bool,
}

impl<T> Slice<T> {
    /// Shapes over-fetched rows into a slice, dropping the sentinel row.
    #[must_use]
    pub fn from_overfetch(mut rows: Vec<T>, page: PageRequest) -> Self {
        let page_size = usize::try_from(page.page_size()).unwrap_or(usize::MAX);
        let has_next = rows.len() > page_size;
        rows.truncate(page_size);
        Self {
            content: rows,
            page,
            has_next,
        }
    }
}
