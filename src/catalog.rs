// Session snapshot of the fetched catalog

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::dates::DateDeriver;
use crate::record::Product;
use crate::source::{CatalogSource, FetchError};

/// Outcome of an asynchronous load, consumed synchronously once settled
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Pending,
    Ready(T),
    Failed(FetchError),
}

impl<T> LoadState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Immutable products + categories, shared by reference once loaded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub categories: Vec<String>,
}

impl Snapshot {
    /// Build a snapshot from freshly decoded products, deriving each "date added"
    pub fn ingest(products: Vec<Product>, categories: Vec<String>, deriver: &DateDeriver) -> Self {
        let products = products.into_iter().map(|p| p.with_derived_date(deriver)).collect();
        Self { products, categories }
    }

    pub fn product(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// Handle for one issued load; only the most recently issued ticket may settle the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Holds the fetched collection for the session.
///
/// Starts in [`LoadState::Pending`]. A load either installs a complete
/// snapshot or moves the catalog to [`LoadState::Failed`]; partial results are
/// never served.
#[derive(Debug)]
pub struct Catalog {
    state: LoadState<Arc<Snapshot>>,
    issued: u64,
    deriver: DateDeriver,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DateDeriver::today())
    }
}

impl Catalog {
    pub fn new(deriver: DateDeriver) -> Self {
        Self {
            state: LoadState::Pending,
            issued: 0,
            deriver,
        }
    }

    pub fn state(&self) -> &LoadState<Arc<Snapshot>> {
        &self.state
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.ready().cloned()
    }

    pub fn deriver(&self) -> &DateDeriver {
        &self.deriver
    }

    /// Issue a new load. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        debug!(generation = self.issued, "Catalog load issued");
        LoadTicket(self.issued)
    }

    /// Settle a load. Returns false (and changes nothing) when a newer load was issued after `ticket`.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Snapshot, FetchError>) -> bool {
        if ticket.0 != self.issued {
            warn!(
                generation = ticket.0,
                latest = self.issued,
                "Discarding stale catalog response"
            );
            return false;
        }

        self.state = match result {
            Ok(snapshot) => {
                info!(
                    products = snapshot.products.len(),
                    categories = snapshot.categories.len(),
                    "Catalog loaded"
                );
                LoadState::Ready(Arc::new(snapshot))
            }
            Err(e) => {
                warn!(error = %e, "Catalog load failed");
                LoadState::Failed(e)
            }
        };
        true
    }

    /// Fetch products and categories from `source`
    ///
    /// Both requests must succeed; the first failure becomes the catalog's error.
    pub fn fetch<S: CatalogSource + ?Sized>(&self, source: &S) -> Result<Snapshot, FetchError> {
        let page = source.fetch_products()?;
        let categories = source.fetch_categories()?;
        Ok(Snapshot::ingest(page.products, categories, &self.deriver))
    }

    /// Issue, run and settle a load in one step
    pub fn load<S: CatalogSource + ?Sized>(&mut self, source: &S) -> &LoadState<Arc<Snapshot>> {
        let ticket = self.begin_load();
        let result = self.fetch(source);
        self.finish_load(ticket, result);
        &self.state
    }

    /// Fetch one product for a detail view, deriving its date like the collection
    pub fn fetch_product<S: CatalogSource + ?Sized>(&self, source: &S, id: u64) -> Result<Product, FetchError> {
        Ok(source.fetch_product(id)?.with_derived_date(&self.deriver))
    }
}
