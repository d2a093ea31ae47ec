// Persistent set of favorite product ids

use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::record::ProductId;
use crate::storage::KeyValueStore;

/// Storage key holding the favorites payload (a JSON array of ids)
pub const FAVORITES_KEY: &str = "favorites";

/// Lifecycle of the favorites set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoritesState {
    /// Storage not consulted yet; nothing may be written
    Loading,
    /// Set established; every mutation is persisted
    Ready,
}

/// Favorites backed by durable storage.
///
/// Nothing is written until [`FavoritesStore::load`] has run, so a toggle that
/// races the initial read cannot replace saved favorites with an empty set.
/// Toggles made while loading record the membership the caller was told about,
/// and that membership is applied on top of the loaded set.
pub struct FavoritesStore<S: KeyValueStore> {
    storage: S,
    ids: BTreeSet<ProductId>,
    pending: Vec<(ProductId, bool)>,
    state: FavoritesState,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// New store in the loading state
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            ids: BTreeSet::new(),
            pending: Vec::new(),
            state: FavoritesState::Loading,
        }
    }

    /// Construct and load in one step
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    pub fn state(&self) -> FavoritesState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == FavoritesState::Ready
    }

    /// Read the saved set and become ready.
    ///
    /// A missing key, unreadable storage or malformed payload all fall back to
    /// an empty set. Calling this again once ready is a no-op.
    pub fn load(&mut self) {
        if self.is_ready() {
            return;
        }

        self.ids = self.read_saved();
        self.state = FavoritesState::Ready;
        info!(count = self.ids.len(), "Loaded favorites");

        if !self.pending.is_empty() {
            debug!(count = self.pending.len(), "Replaying favorites toggled while loading");
            for (id, favorite) in std::mem::take(&mut self.pending) {
                self.set_membership(id, favorite);
            }
            self.persist();
        }
    }

    fn read_saved(&self) -> BTreeSet<ProductId> {
        let payload = match self.storage.get(FAVORITES_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return BTreeSet::new(),
            Err(e) => {
                warn!(error = ?e, "Failed to read favorites, starting empty");
                return BTreeSet::new();
            }
        };

        match serde_json::from_str::<Vec<ProductId>>(&payload) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                warn!(error = ?e, "Failed to parse favorites, starting empty");
                BTreeSet::new()
            }
        }
    }

    /// Flip membership of `id`; returns whether it is now a favorite
    pub fn toggle(&mut self, id: ProductId) -> bool {
        if !self.is_ready() {
            let now_favorite = self.flip(id);
            self.pending.push((id, now_favorite));
            return now_favorite;
        }

        let now_favorite = self.flip(id);
        self.persist();
        now_favorite
    }

    fn set_membership(&mut self, id: ProductId, favorite: bool) {
        if favorite {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    fn flip(&mut self, id: ProductId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    /// Favorites in ascending id order
    pub fn ids(&self) -> Vec<ProductId> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Best-effort write; failures are logged and otherwise ignored
    fn persist(&mut self) {
        let payload = match serde_json::to_string(&self.ids) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = ?e, "Failed to serialize favorites");
                return;
            }
        };

        if let Err(e) = self.storage.set(FAVORITES_KEY, &payload) {
            warn!(error = ?e, "Failed to persist favorites");
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use eyre::{Result, eyre};
    use tempfile::TempDir;

    /// Storage whose writes and reads always fail
    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(eyre!("disk on fire"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(eyre!("disk on fire"))
        }
    }

    fn seeded(payload: &str) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        storage.set(FAVORITES_KEY, payload).unwrap();
        storage
    }

    #[test]
    fn test_starts_loading() {
        let store = FavoritesStore::new(MemoryStorage::new());
        assert_eq!(store.state(), FavoritesState::Loading);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_reads_saved_ids() {
        let store = FavoritesStore::open(seeded("[3,1,2]"));
        assert!(store.is_ready());
        assert_eq!(store.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_payload_is_empty() {
        let store = FavoritesStore::open(MemoryStorage::new());
        assert!(store.is_ready());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_payload_is_empty_and_ready() {
        for payload in ["not json", "{\"a\":1}", "[1, \"two\"]", ""] {
            let store = FavoritesStore::open(seeded(payload));
            assert!(store.is_ready(), "payload {:?}", payload);
            assert!(store.is_empty(), "payload {:?}", payload);
        }
    }

    #[test]
    fn test_read_failure_is_empty_and_ready() {
        let store = FavoritesStore::open(BrokenStorage);
        assert!(store.is_ready());
        assert!(store.is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut store = FavoritesStore::open(seeded("[5]"));

        assert!(!store.toggle(5));
        assert!(!store.is_favorite(5));
        assert!(store.toggle(5));
        assert!(store.is_favorite(5));

        assert!(store.toggle(8));
        assert!(store.is_favorite(8));
        assert!(!store.toggle(8));
        assert!(!store.is_favorite(8));
    }

    #[test]
    fn test_toggle_persists_sorted_array() {
        let mut store = FavoritesStore::open(MemoryStorage::new());
        store.toggle(9);
        store.toggle(2);
        assert_eq!(store.storage().get(FAVORITES_KEY).unwrap().as_deref(), Some("[2,9]"));

        store.toggle(9);
        assert_eq!(store.storage().get(FAVORITES_KEY).unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_nothing_written_while_loading() {
        let mut store = FavoritesStore::new(seeded("[1,2]"));
        store.toggle(7);
        assert_eq!(store.storage().get(FAVORITES_KEY).unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_toggles_while_loading_are_replayed() {
        let mut store = FavoritesStore::new(seeded("[1,2]"));
        assert!(store.toggle(7));
        assert!(store.toggle(2));

        store.load();
        assert_eq!(store.ids(), vec![1, 2, 7]);
        assert_eq!(store.storage().get(FAVORITES_KEY).unwrap().as_deref(), Some("[1,2,7]"));
    }

    #[test]
    fn test_toggle_while_loading_keeps_reported_membership() {
        let mut store = FavoritesStore::new(seeded("[1,2]"));

        // saved id toggled before the saved set is known: caller is told "added"
        assert!(store.toggle(1));
        assert!(store.is_favorite(1));

        store.load();
        assert!(store.is_favorite(1));
        assert_eq!(store.ids(), vec![1, 2]);

        // a second toggle before load is a removal, and stays one
        let mut store = FavoritesStore::new(seeded("[1,2]"));
        assert!(store.toggle(2));
        assert!(!store.toggle(2));

        store.load();
        assert!(!store.is_favorite(2));
        assert_eq!(store.ids(), vec![1]);
        assert_eq!(store.storage().get(FAVORITES_KEY).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_load_without_pending_does_not_write() {
        let mut store = FavoritesStore::new(seeded("[4, 4, 1]"));
        store.load();
        assert_eq!(store.ids(), vec![1, 4]);
        // untouched until the first mutation
        assert_eq!(store.storage().get(FAVORITES_KEY).unwrap().as_deref(), Some("[4, 4, 1]"));
    }

    #[test]
    fn test_second_load_is_noop() {
        let mut store = FavoritesStore::open(seeded("[1]"));
        store.toggle(2);
        store.load();
        assert_eq!(store.ids(), vec![1, 2]);
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        let mut store = FavoritesStore::open(BrokenStorage);
        assert!(store.toggle(3));
        assert!(store.is_favorite(3));
    }

    #[test]
    fn test_round_trip_through_file_storage() {
        let temp = TempDir::new().unwrap();

        let mut store = FavoritesStore::open(FileStorage::open(temp.path()).unwrap());
        store.toggle(1);
        store.toggle(30);
        store.toggle(12);
        let before = store.ids();
        drop(store);

        let reloaded = FavoritesStore::open(FileStorage::open(temp.path()).unwrap());
        assert_eq!(reloaded.ids(), before);
    }
}
