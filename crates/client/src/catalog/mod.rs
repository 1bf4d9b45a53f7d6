//! Paginated, filter-scoped catalog cache.
//!
//! # Behavior
//!
//! - Pages for the active filter are fetched strictly one at a time and
//!   appended in order; a short page ends the sequence.
//! - Switching filters keeps the previous items visible until the new
//!   filter's first page lands, then replaces them in one step.
//! - Every fetch carries a [`RequestToken`]; a response whose token is no
//!   longer current (filter switched, refreshed, cancelled) is dropped.
//! - Failed fetches are retried up to `max_retries` times, then surfaced
//!   through [`CatalogCache::last_error`] with existing pages untouched.
//!
//! State changes are published as [`CatalogSnapshot`]s on a
//! `tokio::sync::watch` channel.

mod page;
mod request;
mod retry;
mod snapshot;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pocketshop_core::{Filter, Item, ItemId};
use tokio::sync::watch;
use tracing::{debug, error, instrument, warn};

use crate::config::SyncConfig;
use crate::source::{CatalogError, CatalogSource};

pub use page::CatalogPage;
pub use snapshot::CatalogSnapshot;

use page::PageSet;
use request::{RequestKind, RequestToken, RequestTracker};
use retry::with_retry;

/// Catalog cache shared by every catalog screen.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<CatalogCacheInner>,
}

struct CatalogCacheInner {
    source: Arc<dyn CatalogSource>,
    config: SyncConfig,
    state: Mutex<CacheState>,
    status: watch::Sender<CatalogSnapshot>,
}

#[derive(Debug, Default)]
struct CacheState {
    active: Filter,
    displayed: Option<PageSet>,
    requests: RequestTracker,
    last_error: Option<Arc<CatalogError>>,
    /// Kind of the request that last failed, for manual retry.
    failed: Option<RequestKind>,
}

impl CacheState {
    fn has_more(&self) -> bool {
        match &self.displayed {
            Some(set) if set.filter() == &self.active => !set.is_exhausted(),
            _ => true,
        }
    }

    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            active_filter: self.active.clone(),
            displayed_filter: self.displayed.as_ref().map(|set| set.filter().clone()),
            items: self
                .displayed
                .as_ref()
                .map(PageSet::items)
                .unwrap_or_default(),
            page_count: self.displayed.as_ref().map_or(0, |set| set.pages().len()),
            is_fetching: self.requests.pending().is_some(),
            has_more: self.has_more(),
            last_error: self.last_error.clone(),
        }
    }
}

impl CatalogCache {
    /// Create a cache over `source`. Nothing is fetched until the first
    /// [`set_filter`](Self::set_filter) or [`fetch_next_page`](Self::fetch_next_page).
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>, config: SyncConfig) -> Self {
        let (status, _) = watch::channel(CatalogSnapshot {
            has_more: true,
            ..CatalogSnapshot::default()
        });

        Self {
            inner: Arc::new(CatalogCacheInner {
                source,
                config,
                state: Mutex::new(CacheState::default()),
                status,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish under the state lock so snapshots land in mutation order.
    fn publish(&self) {
        let state = self.lock();
        self.inner.status.send_replace(state.snapshot());
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// Switch the active filter and load its first page.
    ///
    /// The current items stay visible until the new first page arrives.
    /// Switching back to the filter already on screen (and still fresh)
    /// cancels the pending switch without fetching.
    #[instrument(skip(self), fields(filter = %filter))]
    pub async fn set_filter(&self, filter: Filter) {
        let token = {
            let mut state = self.lock();

            let showing = state.displayed.as_ref().is_some_and(|set| {
                set.filter() == &filter && !set.is_stale(self.inner.config.stale_window)
            });
            if showing {
                let superseded = state
                    .requests
                    .pending()
                    .is_some_and(|pending| pending.filter != filter);
                if superseded {
                    state.requests.cancel();
                    debug!("Cancelled pending filter switch");
                }
                state.active = filter;
                drop(state);
                self.publish();
                return;
            }

            let loading = state.requests.pending().is_some_and(|pending| {
                pending.filter == filter && pending.kind == RequestKind::FirstPage
            });
            if state.active == filter && loading {
                debug!("Filter already loading");
                return;
            }

            state.active = filter.clone();
            state.last_error = None;
            state.failed = None;
            state.requests.issue(filter, 0, RequestKind::FirstPage)
        };

        self.run(token).await;
    }

    /// Fetch the next page for the active filter.
    ///
    /// No-op while a fetch is in flight or after a short page. If the active
    /// filter has no pages on screen yet, fetches its first page.
    #[instrument(skip(self))]
    pub async fn fetch_next_page(&self) {
        let token = {
            let mut state = self.lock();
            if state.requests.pending().is_some() {
                debug!("Fetch already in flight");
                return;
            }

            let active = state.active.clone();
            let next = match state.displayed.as_ref() {
                Some(set) if set.filter() == &active => {
                    if set.is_exhausted() {
                        debug!("No more pages");
                        return;
                    }
                    Some(set.next_index())
                }
                _ => None,
            };

            match next {
                Some(page) => state.requests.issue(active, page, RequestKind::NextPage),
                None => state.requests.issue(active, 0, RequestKind::FirstPage),
            }
        };

        self.run(token).await;
    }

    /// Discard held pages for the active filter and refetch page 0.
    ///
    /// Items stay visible until the refetch lands; on failure they are kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        let token = {
            let mut state = self.lock();
            let active = state.active.clone();
            state.requests.issue(active, 0, RequestKind::FirstPage)
        };

        self.inner.source.invalidate(&token.filter).await;
        self.run(token).await;
    }

    /// Re-issue the fetch that last failed.
    #[instrument(skip(self))]
    pub async fn retry(&self) {
        let token = {
            let mut state = self.lock();
            if state.requests.pending().is_some() {
                return;
            }
            match state.failed.take() {
                Some(RequestKind::FirstPage) => {
                    let active = state.active.clone();
                    Some(state.requests.issue(active, 0, RequestKind::FirstPage))
                }
                Some(RequestKind::NextPage) | None => None,
            }
        };

        match token {
            Some(token) => self.run(token).await,
            None => self.fetch_next_page().await,
        }
    }

    /// Drop relevance of any outstanding fetch. Displayed items are kept.
    pub fn cancel_pending(&self) {
        let cancelled = self.lock().requests.cancel();
        if let Some(token) = cancelled {
            debug!(seq = token.seq, filter = %token.filter, "Cancelled pending fetch");
            self.publish();
        }
    }

    async fn run(&self, token: RequestToken) {
        self.publish();

        let config = &self.inner.config;
        let result = with_retry(
            config,
            "fetch_page",
            || self.lock().requests.is_current(&token),
            || {
                self.inner
                    .source
                    .fetch_page(&token.filter, token.page, config.page_size)
            },
        )
        .await;

        {
            let mut state = self.lock();
            if !state.requests.complete(&token) {
                debug!(
                    seq = token.seq,
                    filter = %token.filter,
                    page = token.page,
                    "Dropping stale catalog response"
                );
                return;
            }

            match result {
                Ok(items) => {
                    debug!(
                        filter = %token.filter,
                        page = token.page,
                        count = items.len(),
                        "Catalog page loaded"
                    );
                    let page = CatalogPage::new(token.filter.clone(), token.page, items);
                    match token.kind {
                        RequestKind::FirstPage => {
                            let mut set = PageSet::new(token.filter.clone());
                            set.push(page, config.page_size);
                            state.displayed = Some(set);
                        }
                        RequestKind::NextPage => match state.displayed.as_mut() {
                            Some(set) if set.filter() == &token.filter => {
                                set.push(page, config.page_size);
                            }
                            _ => warn!(filter = %token.filter, "Next page without matching first page"),
                        },
                    }
                    state.last_error = None;
                    state.failed = None;
                }
                Err(e) => {
                    error!(
                        filter = %token.filter,
                        page = token.page,
                        error = %e,
                        "Catalog fetch failed"
                    );
                    state.last_error = Some(Arc::new(e));
                    state.failed = Some(token.kind);
                }
            }
        }

        self.publish();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All displayed items, in fetch order.
    #[must_use]
    pub fn flattened_items(&self) -> Vec<Item> {
        self.lock()
            .displayed
            .as_ref()
            .map(PageSet::items)
            .unwrap_or_default()
    }

    /// Displayed pages, in fetch order.
    #[must_use]
    pub fn pages(&self) -> Vec<CatalogPage> {
        self.lock()
            .displayed
            .as_ref()
            .map(|set| set.pages().to_vec())
            .unwrap_or_default()
    }

    /// Whether another page may exist for the active filter.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.lock().has_more()
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.lock().requests.pending().is_some()
    }

    /// Error from the most recent failed fetch, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<Arc<CatalogError>> {
        self.lock().last_error.clone()
    }

    #[must_use]
    pub fn active_filter(&self) -> Filter {
        self.lock().active.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.lock().snapshot()
    }

    /// Subscribe to snapshots published after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.inner.status.subscribe()
    }

    // =========================================================================
    // Pass-through lookups
    // =========================================================================

    /// Category tags, with the same retry and timeout policy as paging.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        with_retry(&self.inner.config, "fetch_categories", || true, || {
            self.inner.source.fetch_categories()
        })
        .await
    }

    /// A single item by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for unknown ids, or the last error
    /// once retries are exhausted.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn item(&self, id: ItemId) -> Result<Item, CatalogError> {
        with_retry(&self.inner.config, "fetch_item", || true, || {
            self.inner.source.fetch_item(id)
        })
        .await
    }
}
