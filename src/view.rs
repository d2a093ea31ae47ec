// Read model for the presentation layer

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{Catalog, LoadState, Snapshot};
use crate::favorites::FavoritesStore;
use crate::filter::{self, CategoryFilter, DateRange, FilterState};
use crate::paginate::{self, PageItem, PageState};
use crate::record::{Product, ProductId};
use crate::source::{CatalogSource, FetchError};
use crate::storage::KeyValueStore;

/// What the presentation layer should show
#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    /// Catalog not loaded yet
    Loading,
    /// Catalog load failed; terminal for this attempt
    Failed(FetchError),
    /// Loaded, but nothing matches the filters
    NoResults,
    /// At least one product matches
    Results,
}

/// Composed output for one render
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub status: ViewStatus,
    /// Products on the current page
    pub records: Vec<Product>,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub page_window: Vec<PageItem>,
    pub current_page: usize,
    pub filter: FilterState,
}

impl ViewModel {
    pub fn is_loading(&self) -> bool {
        self.status == ViewStatus::Loading
    }

    pub fn has_error(&self) -> bool {
        matches!(self.status, ViewStatus::Failed(_))
    }

    pub fn is_empty(&self) -> bool {
        self.status == ViewStatus::NoResults
    }

    /// Page controls only make sense with more than one page
    pub fn show_pagination(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// "Showing 10 of 42 products"
    pub fn summary(&self) -> String {
        format!("Showing {} of {} products", self.records.len(), self.total_filtered)
    }
}

/// Filter + page state machine.
///
/// Turns a catalog snapshot into a [`ViewModel`]. Invariant: any change to the
/// filter state resets the current page to 1. Every filter setter goes through
/// [`Browser::set_filter`], which is the only place that enforces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Browser {
    filter: FilterState,
    page: PageState,
}

impl Browser {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: FilterState::default(),
            page: PageState::new(page_size),
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn current_page(&self) -> usize {
        self.page.current()
    }

    pub fn page_size(&self) -> usize {
        self.page.page_size()
    }

    /// Replace the filter state. A different state resets the page to 1.
    ///
    /// Returns whether the state changed.
    pub fn set_filter(&mut self, filter: FilterState) -> bool {
        if filter == self.filter {
            return false;
        }
        debug!(?filter, "Filter changed, resetting to page 1");
        self.filter = filter;
        self.page.reset();
        true
    }

    pub fn set_search(&mut self, query: &str) -> bool {
        self.set_filter(FilterState {
            search_query: query.to_string(),
            ..self.filter.clone()
        })
    }

    pub fn set_category(&mut self, category: CategoryFilter) -> bool {
        self.set_filter(FilterState {
            category,
            ..self.filter.clone()
        })
    }

    pub fn set_date_range(&mut self, date_range: Option<DateRange>) -> bool {
        self.set_filter(FilterState {
            date_range,
            ..self.filter.clone()
        })
    }

    /// Drop every criterion
    pub fn clear_filters(&mut self) -> bool {
        self.set_filter(FilterState::cleared())
    }

    /// Jump to `page` (clamped to at least 1); the filter is untouched
    pub fn set_page(&mut self, page: usize) {
        self.page.set(page);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page.next(total_pages);
    }

    pub fn prev_page(&mut self) {
        self.page.prev();
    }

    /// Filtered products (all pages) for a snapshot
    pub fn filtered<'a>(&self, snapshot: &'a Snapshot) -> Vec<&'a Product> {
        filter::apply(&snapshot.products, &self.filter)
    }

    /// Render the current state of `catalog`
    pub fn view(&self, catalog: &LoadState<Arc<Snapshot>>) -> ViewModel {
        let snapshot = match catalog {
            LoadState::Pending => return self.placeholder(ViewStatus::Loading),
            LoadState::Failed(e) => return self.placeholder(ViewStatus::Failed(e.clone())),
            LoadState::Ready(snapshot) => snapshot,
        };

        let filtered = self.filtered(snapshot);
        let total_pages = paginate::total_pages(filtered.len(), self.page.page_size());
        let records = paginate::page(&filtered, self.page.current(), self.page.page_size())
            .iter()
            .map(|p| (*p).clone())
            .collect();

        ViewModel {
            status: if filtered.is_empty() {
                ViewStatus::NoResults
            } else {
                ViewStatus::Results
            },
            records,
            total_filtered: filtered.len(),
            total_pages,
            page_window: paginate::page_window(self.page.current(), total_pages),
            current_page: self.page.current(),
            filter: self.filter.clone(),
        }
    }

    fn placeholder(&self, status: ViewStatus) -> ViewModel {
        ViewModel {
            status,
            records: Vec::new(),
            total_filtered: 0,
            total_pages: 0,
            page_window: Vec::new(),
            current_page: self.page.current(),
            filter: self.filter.clone(),
        }
    }
}

/// Catalog, browsing state and favorites behind one handle
///
/// Front ends drive this single object instead of wiring the parts together.
pub struct Dashboard<S: KeyValueStore> {
    catalog: Catalog,
    browser: Browser,
    favorites: FavoritesStore<S>,
}

impl<S: KeyValueStore> Dashboard<S> {
    pub fn new(catalog: Catalog, page_size: usize, favorites: FavoritesStore<S>) -> Self {
        Self {
            catalog,
            browser: Browser::new(page_size),
            favorites,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut Browser {
        &mut self.browser
    }

    pub fn favorites(&self) -> &FavoritesStore<S> {
        &self.favorites
    }

    /// Load the catalog and the saved favorites
    pub fn load<C: CatalogSource + ?Sized>(&mut self, source: &C) {
        self.favorites.load();
        self.catalog.load(source);
    }

    pub fn view(&self) -> ViewModel {
        self.browser.view(self.catalog.state())
    }

    pub fn filter_state(&self) -> &FilterState {
        self.browser.filter()
    }

    pub fn set_filter_state(&mut self, filter: FilterState) -> bool {
        self.browser.set_filter(filter)
    }

    pub fn current_page(&self) -> usize {
        self.browser.current_page()
    }

    pub fn set_current_page(&mut self, page: usize) {
        self.browser.set_page(page);
    }

    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.favorites.is_favorite(id)
    }

    pub fn toggle_favorite(&mut self, id: ProductId) -> bool {
        self.favorites.toggle(id)
    }

    /// Why the last catalog load failed, if it did
    pub fn load_error(&self) -> Option<&FetchError> {
        self.catalog.state().error()
    }

    /// Favorite products present in the loaded catalog, in catalog order
    pub fn favorite_products(&self) -> Vec<Product> {
        match self.catalog.state() {
            LoadState::Ready(snapshot) => snapshot
                .products
                .iter()
                .filter(|p| self.favorites.is_favorite(p.id))
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Categories available for the category selector
    pub fn categories(&self) -> Vec<String> {
        self.catalog
            .snapshot()
            .map(|s| s.categories.clone())
            .unwrap_or_default()
    }

    /// Anchor used for derived dates, for date pickers
    pub fn today(&self) -> NaiveDate {
        self.catalog.deriver().anchor()
    }
}
