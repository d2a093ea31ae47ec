// CatalogView - Product catalog browsing with client-side filtering, pagination and favorites

pub mod catalog;
pub mod config;
pub mod dates;
pub mod favorites;
pub mod filter;
pub mod paginate;
pub mod record;
pub mod source;
pub mod storage;
pub mod view;

// Re-export main types for convenience
pub use catalog::{Catalog, LoadState, LoadTicket, Snapshot};
pub use config::{Config, StorageKind};
pub use dates::DateDeriver;
pub use favorites::{FavoritesState, FavoritesStore};
pub use filter::{CategoryFilter, DateRange, FilterState};
pub use paginate::{PageItem, PageState};
pub use record::{Product, ProductId, Record};
pub use source::{CatalogSource, FetchError, HttpSource, StaticSource};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, SqliteStorage};
pub use view::{Browser, Dashboard, ViewModel, ViewStatus};
