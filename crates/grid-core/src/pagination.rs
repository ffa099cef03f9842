//! Page index / page size state with clamping against the total count

use tracing::warn;

use crate::error::{GridError, Result};

/// Page position of a table
///
/// `total_count` is `None` until the first fetch resolves. Until then any
/// page index is accepted; once known, every mutation keeps
/// `page_index * page_size < total_count` (or `page_index == 0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    page_index: usize,
    page_size: usize,
    page_size_options: Vec<usize>,
    total_count: Option<usize>,
}

impl PaginationState {
    /// Create pagination state. A `page_size` missing from the options is
    /// added to them with a warning so the selector can still show it.
    pub fn new(page_size: usize, page_size_options: Vec<usize>) -> Self {
        let page_size = page_size.max(1);
        let mut options: Vec<usize> = page_size_options.into_iter().filter(|s| *s > 0).collect();
        if !options.contains(&page_size) {
            warn!(page_size, ?options, "Default page size is not among the options, adding it");
            options.push(page_size);
        }
        options.sort_unstable();
        options.dedup();

        Self {
            page_index: 0,
            page_size,
            page_size_options: options,
            total_count: None,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    /// Index of the last page that holds at least one item (0 when empty)
    pub fn last_page(&self) -> Option<usize> {
        self.total_count.map(|total| last_page_for(total, self.page_size))
    }

    /// Number of pages, at least one
    pub fn page_count(&self) -> usize {
        self.last_page().map_or(1, |last| last + 1)
    }

    /// Offset of the first item on the current page
    pub fn offset(&self) -> usize {
        self.page_index * self.page_size
    }

    /// 1-based `(first, last)` item numbers shown on the current page
    pub fn item_range(&self) -> (usize, usize) {
        match self.total_count {
            Some(0) | None => (0, 0),
            Some(total) => {
                let first = self.offset() + 1;
                let last = (self.offset() + self.page_size).min(total);
                (first.min(last), last)
            }
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        match self.last_page() {
            Some(last) => self.page_index < last,
            None => false,
        }
    }

    /// Go to a page, clamping into the valid range
    pub fn set_page(&mut self, index: usize) {
        self.page_index = match self.last_page() {
            Some(last) => index.min(last),
            None => index,
        };
    }

    /// Change the page size and return to the first page
    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        if !self.page_size_options.contains(&size) {
            return Err(GridError::InvalidPageSize {
                size,
                allowed: self.page_size_options.clone(),
            });
        }
        self.page_size = size;
        self.page_index = 0;
        Ok(())
    }

    /// Jump back to the first page (after a filter change)
    pub fn reset(&mut self) {
        self.page_index = 0;
    }

    /// Record a new total count. Returns `true` when the current page no
    /// longer exists and was clamped, which means the page must be refetched.
    pub fn on_total_count_changed(&mut self, total_count: usize) -> bool {
        self.total_count = Some(total_count);
        let last = last_page_for(total_count, self.page_size);
        if self.page_index > last {
            self.page_index = last;
            true
        } else {
            false
        }
    }
}

fn last_page_for(total_count: usize, page_size: usize) -> usize {
    if total_count == 0 {
        0
    } else {
        (total_count - 1) / page_size
    }
}
