//! Client-side pagination
//!
//! Pure functions slicing an already-fetched result list into pages and
//! computing the page-number window shown to the user. The service returns
//! the whole matching set, so nothing here ever triggers a fetch.

use serde::Serialize;

/// Maximum number of page buttons shown at once
pub const MAX_VISIBLE_PAGES: usize = 5;

/// Number of pages needed for `total_items`. Zero when there is nothing to show.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// Clamp a requested page into `[1, total_pages]`
///
/// With no pages at all the only valid position is page 1.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Page numbers to display, centered on `current_page` when possible
///
/// The window is shifted near either end so it stays full whenever there are
/// at least `MAX_VISIBLE_PAGES` pages.
pub fn page_window(current_page: usize, total_pages: usize) -> Vec<usize> {
    if total_pages == 0 {
        return Vec::new();
    }

    let half = MAX_VISIBLE_PAGES / 2;
    let start = current_page.saturating_sub(half).max(1);
    let end = (start + MAX_VISIBLE_PAGES - 1).min(total_pages);
    let start = end.saturating_sub(MAX_VISIBLE_PAGES - 1).max(1);

    (start..=end).collect()
}

/// Calculate slice bounds for a given page
///
/// Returns (start_index, end_index) for slicing the items array. The page is
/// clamped first, so the bounds are always valid.
pub fn page_bounds(total_items: usize, page: usize, page_size: usize) -> (usize, usize) {
    let page_size = page_size.max(1);
    let page = clamp_page(page, total_pages(total_items, page_size));
    let start = ((page - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);
    (start, end)
}

/// One page of results plus the navigation data around it
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub page_size: usize,
    pub page_numbers: Vec<usize>,
    /// 1-based position of the first item on this page, 0 when empty
    pub first_index: usize,
    /// 1-based position of the last item on this page, 0 when empty
    pub last_index: usize,
}

impl<T> Page<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.total_results == 0
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Derive the visible page from the full result list
pub fn paginate<T>(items: &[T], current_page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_results = items.len();
    let total_pages = total_pages(total_results, page_size);
    let current_page = clamp_page(current_page, total_pages);
    let (start, end) = page_bounds(total_results, current_page, page_size);

    let (first_index, last_index) = if start < end {
        (start + 1, end)
    } else {
        (0, 0)
    };

    Page {
        items: &items[start..end],
        current_page,
        total_pages,
        total_results,
        page_size,
        page_numbers: page_window(current_page, total_pages),
        first_index,
        last_index,
    }
}
