// Page slicing and page-number window computation

use std::fmt;

/// Products per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Up to this many pages, every page number is listed
pub const FULL_WINDOW_MAX: usize = 10;

/// Pages shown on each side of the current one in a truncated window
pub const WINDOW_RADIUS: usize = 2;

/// One entry of a page-number control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => write!(f, "…"),
        }
    }
}

/// Items on 1-based page `page_index`; empty when the page starts past the end
///
/// `page_size` must be positive.
pub fn page<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    let start = page_index.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// `ceil(count / page_size)`; zero for an empty collection
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size)
}

/// Page numbers to display for `current` out of `total`.
///
/// With at most [`FULL_WINDOW_MAX`] pages every number is listed. Beyond that
/// the first and last page are always shown along with every page within
/// [`WINDOW_RADIUS`] of `current`; each run of hidden pages collapses into a
/// single [`PageItem::Ellipsis`].
pub fn page_window(current: usize, total: usize) -> Vec<PageItem> {
    if total <= FULL_WINDOW_MAX {
        return (1..=total).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total);
    let low = current.saturating_sub(WINDOW_RADIUS).max(1);
    let high = (current + WINDOW_RADIUS).min(total);

    let mut shown = vec![1];
    shown.extend((low..=high).filter(|&p| p != 1 && p != total));
    shown.push(total);

    let mut window = Vec::with_capacity(shown.len() + 2);
    let mut previous = 0;
    for page in shown {
        if previous != 0 && page > previous + 1 {
            window.push(PageItem::Ellipsis);
        }
        window.push(PageItem::Page(page));
        previous = page;
    }
    window
}

/// Current page plus the fixed page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current: usize,
    page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    /// A zero page size is bumped to one
    pub fn new(page_size: usize) -> Self {
        Self {
            current: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Jump to `page`, never below 1
    pub fn set(&mut self, page: usize) {
        self.current = page.max(1);
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Advance unless already on the last of `total` pages
    pub fn next(&mut self, total: usize) {
        if self.current < total {
            self.current += 1;
        }
    }

    /// Step back unless already on page 1
    pub fn prev(&mut self) {
        if self.current > 1 {
            self.current -= 1;
        }
    }
}
