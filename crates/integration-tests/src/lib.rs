//! Integration tests for the Pocketshop client engine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocketshop-integration-tests
//! ```
//!
//! # Fixtures
//!
//! - [`ScriptedSource`] - In-memory catalog source with per-page gates,
//!   queued failures and a call log
//! - [`FailingStore`] - Durable store whose writes can be switched to fail
//! - [`item`] / [`items`] - Item builders

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use pocketshop_client::source::page_window;
use pocketshop_client::{
    CatalogError, CatalogSource, Filter, Item, ItemId, KeyValueStore, MemoryStore, Rating,
    StorageError, SyncConfig,
};
use rust_decimal::Decimal;
use tokio::sync::Notify;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Builders
// =============================================================================

/// An item priced in cents.
#[must_use]
pub fn item(id: i32, category: &str, price_cents: i64) -> Item {
    Item {
        id: ItemId::new(id),
        title: format!("{category} #{id}"),
        price: Decimal::new(price_cents, 2),
        description: format!("Description of item {id}"),
        category: category.to_string(),
        image: format!("https://img.example/{id}.jpg"),
        rating: Rating {
            rate: 4.0,
            count: 10,
        },
    }
}

/// Items with ids `first..first + count`, each priced at `id` dollars.
#[must_use]
pub fn items(first: i32, count: i32, category: &str) -> Vec<Item> {
    (first..first + count)
        .map(|id| item(id, category, i64::from(id) * 100))
        .collect()
}

/// Default paging with a short timeout so timeout paths run quickly.
#[must_use]
pub fn fast_config() -> SyncConfig {
    SyncConfig {
        fetch_timeout: Duration::from_millis(250),
        ..SyncConfig::default()
    }
}

// =============================================================================
// Scripted catalog source
// =============================================================================

/// Holds one scripted fetch until opened.
pub struct Gate(Arc<Notify>);

impl Gate {
    /// Let the held fetch return.
    pub fn open(&self) {
        self.0.notify_one();
    }
}

/// Catalog source backed by a fixed item list.
///
/// `fetch_page` windows the items matching the filter, in list order.
#[derive(Default)]
pub struct ScriptedSource {
    catalog: Vec<Item>,
    gates: Mutex<HashMap<(Filter, usize), Arc<Notify>>>,
    failures: Mutex<VecDeque<CatalogError>>,
    calls: Mutex<Vec<(Filter, usize)>>,
    invalidations: AtomicUsize,
    rotation: AtomicUsize,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(catalog: Vec<Item>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Hold the next fetch of `page` under `filter` until the gate opens.
    pub fn gate(&self, filter: Filter, page: usize) -> Gate {
        let notify = Arc::new(Notify::new());
        lock(&self.gates).insert((filter, page), notify.clone());
        Gate(notify)
    }

    /// Fail the next page fetch with `error`. Failures queue in order.
    pub fn fail_next(&self, error: CatalogError) {
        lock(&self.failures).push_back(error);
    }

    /// Rotate the matching list left by `by` for later fetches, as if the
    /// backend reordered its list mid-session.
    pub fn rotate(&self, by: usize) {
        self.rotation.store(by, Ordering::SeqCst);
    }

    /// Every page fetch so far, as (filter, page).
    #[must_use]
    pub fn calls(&self) -> Vec<(Filter, usize)> {
        lock(&self.calls).clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    #[must_use]
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` page fetches have started.
    ///
    /// # Panics
    ///
    /// Panics if that does not happen within a second.
    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..1000 {
            if self.call_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("expected {count} fetches, saw {}", self.call_count());
    }

    fn matching(&self, filter: &Filter) -> Vec<Item> {
        let mut matching = self
            .catalog
            .iter()
            .filter(|item| filter.as_category().is_none_or(|c| item.category == c))
            .cloned()
            .collect::<Vec<_>>();
        if !matching.is_empty() {
            let by = self.rotation.load(Ordering::SeqCst) % matching.len();
            matching.rotate_left(by);
        }
        matching
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch_page(
        &self,
        filter: &Filter,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Item>, CatalogError> {
        lock(&self.calls).push((filter.clone(), page));

        let gate = lock(&self.gates).remove(&(filter.clone(), page));
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = lock(&self.failures).pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        Ok(page_window(&self.matching(filter), page, page_size))
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
        let mut categories: Vec<String> = Vec::new();
        for item in &self.catalog {
            if !categories.contains(&item.category) {
                categories.push(item.category.clone());
            }
        }
        Ok(categories)
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Item, CatalogError> {
        self.catalog
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn invalidate(&self, _filter: &Filter) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Durable store with switchable failures
// =============================================================================

/// In-memory durable store whose writes fail while `failing` is set.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    failing: AtomicBool,
    write_attempts: AtomicUsize,
}

impl FailingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for FailingStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.inner.write(key, bytes)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}
