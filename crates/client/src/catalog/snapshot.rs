//! Observable catalog status.

use std::sync::Arc;

use pocketshop_core::{Filter, Item};

use crate::source::CatalogError;

/// Point-in-time view of the catalog cache, published on every transition.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// Filter most recently requested.
    pub active_filter: Filter,
    /// Filter the visible items belong to. Differs from `active_filter`
    /// while a filter switch is loading.
    pub displayed_filter: Option<Filter>,
    /// Flattened items of the displayed pages.
    pub items: Vec<Item>,
    pub page_count: usize,
    pub is_fetching: bool,
    pub has_more: bool,
    pub last_error: Option<Arc<CatalogError>>,
}

impl CatalogSnapshot {
    /// Whether the visible items are placeholders for a filter still loading.
    #[must_use]
    pub fn is_switching(&self) -> bool {
        self.displayed_filter.as_ref() != Some(&self.active_filter)
    }
}
