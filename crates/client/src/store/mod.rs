//! Persistent cart and favorites store.
//!
//! The store is the single source of truth for cart lines and favorites.
//! Every mutation is applied to the in-memory state in one step (readers
//! never see a half-updated line) and then written to a [`KeyValueStore`].
//! Write failures are logged and do not roll back the mutation; the next
//! mutation writes the full state again.
//!
//! Aggregates such as [`CartStore::cart_total`] are computed from the
//! current lines on every call.

mod persist;
mod selector;
mod state;
mod storage;

use std::sync::{Arc, Mutex, PoisonError};

use pocketshop_core::{CartLine, Item, ItemId};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

pub use persist::{PersistedSnapshot, RestoreError, SCHEMA_VERSION, STORAGE_KEY};
pub use selector::Selector;
pub use state::{BrowseState, SortMode, StoreState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

/// Cart and favorites store shared by every screen.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<StoreState>,
    /// Serializes writes so the last one to finish carries the latest state.
    persist_lock: Mutex<()>,
}

impl CartStore {
    /// Empty store backed by `storage`. Does not read existing data.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_state(storage, StoreState::default())
    }

    /// Load the persisted snapshot from `storage`.
    ///
    /// A missing, unreadable, corrupt or version-mismatched snapshot yields
    /// an empty store; the failure is logged.
    #[instrument(skip(storage))]
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let state = match storage.read(STORAGE_KEY) {
            Ok(Some(bytes)) => match PersistedSnapshot::decode(&bytes) {
                Ok(snapshot) => {
                    let state = snapshot.into_state();
                    info!(
                        lines = state.line_count(),
                        favorites = state.favorite_count(),
                        "Restored cart"
                    );
                    state
                }
                Err(e) => {
                    warn!(error = %e, "Discarding unusable cart snapshot");
                    StoreState::default()
                }
            },
            Ok(None) => {
                debug!("No persisted cart");
                StoreState::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart");
                StoreState::default()
            }
        };

        Self::with_state(storage, state)
    }

    fn with_state(storage: Arc<dyn KeyValueStore>, state: StoreState) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                state,
                persist_lock: Mutex::new(()),
            }),
        }
    }

    /// Apply `f` atomically; persist and notify only if it reports a change.
    fn mutate(&self, f: impl FnOnce(&mut StoreState) -> bool) -> bool {
        let changed = self.inner.state.send_if_modified(f);
        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&self) {
        let _guard = self
            .inner
            .persist_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let snapshot = PersistedSnapshot::from_state(&self.inner.state.borrow());
        let bytes = match snapshot.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to encode cart snapshot");
                return;
            }
        };

        match self.inner.storage.write(STORAGE_KEY, &bytes) {
            Ok(()) => debug!(bytes = bytes.len(), "Cart persisted"),
            Err(e) => warn!(error = %e, "Failed to persist cart"),
        }
    }

    // =========================================================================
    // Cart mutations
    // =========================================================================

    /// Add `quantity` of `item`, merging into an existing line.
    ///
    /// A quantity of 0 does nothing. Returns whether the cart changed.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub fn add_to_cart(&self, item: &Item, quantity: u32) -> bool {
        self.mutate(|state| state.add_to_cart(item, quantity))
    }

    /// Set a line's quantity directly. `quantity <= 0` removes the line.
    ///
    /// Does nothing if `item_id` has no line.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub fn set_quantity(&self, item_id: ItemId, quantity: i64) -> bool {
        self.mutate(|state| state.set_quantity(item_id, quantity))
    }

    /// Add one to an existing line.
    pub fn increment(&self, item_id: ItemId) -> bool {
        self.mutate(|state| match state.line(item_id).map(|line| line.quantity) {
            Some(quantity) => state.set_quantity(item_id, i64::from(quantity) + 1),
            None => false,
        })
    }

    /// Remove one from an existing line, dropping it at zero.
    pub fn decrement(&self, item_id: ItemId) -> bool {
        self.mutate(|state| state.decrement(item_id))
    }

    pub fn remove_from_cart(&self, item_id: ItemId) -> bool {
        self.mutate(|state| state.remove_from_cart(item_id))
    }

    pub fn clear_cart(&self) -> bool {
        self.mutate(StoreState::clear_cart)
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Add `item` to favorites. Adding a member again does nothing.
    pub fn add_to_favorites(&self, item: &Item) -> bool {
        self.mutate(|state| state.add_favorite(item))
    }

    /// Remove `item_id` from favorites. Removing a non-member does nothing.
    pub fn remove_from_favorites(&self, item_id: ItemId) -> bool {
        self.mutate(|state| state.remove_favorite(item_id))
    }

    /// Flip membership; returns whether `item` is a favorite afterwards.
    pub fn toggle_favorite(&self, item: &Item) -> bool {
        let mut now_favorite = false;
        self.mutate(|state| {
            if state.is_favorite(item.id) {
                state.remove_favorite(item.id)
            } else {
                now_favorite = true;
                state.add_favorite(item)
            }
        });
        now_favorite
    }

    pub fn clear_favorites(&self) -> bool {
        self.mutate(StoreState::clear_favorites)
    }

    // =========================================================================
    // Browse state (in memory only)
    // =========================================================================

    pub fn set_search_text(&self, text: &str) {
        self.inner
            .state
            .send_if_modified(|state| state.set_search_text(text));
    }

    pub fn set_sort_mode(&self, mode: SortMode) {
        self.inner
            .state
            .send_if_modified(|state| state.set_sort_mode(mode));
    }

    #[must_use]
    pub fn browse(&self) -> BrowseState {
        self.inner.state.borrow().browse().clone()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.inner.state.borrow().cart_total()
    }

    #[must_use]
    pub fn cart_item_count(&self) -> u32 {
        self.inner.state.borrow().cart_item_count()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.inner.state.borrow().line_count()
    }

    #[must_use]
    pub fn line_total(&self, item_id: ItemId) -> Decimal {
        self.inner.state.borrow().line_total(item_id)
    }

    #[must_use]
    pub fn quantity_in_cart(&self, item_id: ItemId) -> u32 {
        self.inner.state.borrow().quantity_in_cart(item_id)
    }

    #[must_use]
    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.inner.state.borrow().cart_lines().cloned().collect()
    }

    #[must_use]
    pub fn is_favorite(&self, item_id: ItemId) -> bool {
        self.inner.state.borrow().is_favorite(item_id)
    }

    #[must_use]
    pub fn favorites(&self) -> Vec<Item> {
        self.inner.state.borrow().favorites().cloned().collect()
    }

    /// Copy of the full in-memory state.
    #[must_use]
    pub fn state(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    /// The durable part of the current state.
    #[must_use]
    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot::from_state(&self.inner.state.borrow())
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.state.subscribe()
    }

    /// Observe one slice of the state, e.g. the badge count.
    #[must_use]
    pub fn select<T, F>(&self, project: F) -> Selector<T, F>
    where
        T: Clone + PartialEq,
        F: Fn(&StoreState) -> T,
    {
        Selector::new(self.inner.state.subscribe(), project)
    }
}
