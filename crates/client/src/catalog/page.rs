//! Fetched pages and the per-filter page sequence.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use pocketshop_core::{Filter, Item, ItemId};
use tracing::warn;

/// One bounded-size fetch result for a filter and page index.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    /// Filter the page was fetched under.
    pub filter: Filter,
    /// Zero-based page index.
    pub index: usize,
    pub items: Vec<Item>,
    pub fetched_at: DateTime<Utc>,
}

impl CatalogPage {
    /// Create a page stamped with the current time.
    #[must_use]
    pub fn new(filter: Filter, index: usize, items: Vec<Item>) -> Self {
        Self {
            filter,
            index,
            items,
            fetched_at: Utc::now(),
        }
    }
}

/// Append-only page sequence for a single filter.
///
/// A new filter always starts a new `PageSet`; pages from different filters
/// are never merged.
#[derive(Debug, Clone)]
pub(crate) struct PageSet {
    filter: Filter,
    pages: Vec<CatalogPage>,
    seen: HashSet<ItemId>,
    /// Index of the next page to request. Advances even when dedup empties
    /// a page, so `pages.len()` can lag behind it.
    next_index: usize,
    exhausted: bool,
}

impl PageSet {
    pub(crate) fn new(filter: Filter) -> Self {
        Self {
            filter,
            pages: Vec::new(),
            seen: HashSet::new(),
            next_index: 0,
            exhausted: false,
        }
    }

    pub(crate) const fn filter(&self) -> &Filter {
        &self.filter
    }

    pub(crate) fn pages(&self) -> &[CatalogPage] {
        &self.pages
    }

    /// Index of the page to request next.
    pub(crate) const fn next_index(&self) -> usize {
        self.next_index
    }

    /// Whether a short page has been seen.
    pub(crate) const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Append a page. A page shorter than `page_size` marks the end of data;
    /// an empty page is not kept.
    pub(crate) fn push(&mut self, mut page: CatalogPage, page_size: usize) {
        if page.items.len() < page_size {
            self.exhausted = true;
        }
        self.next_index = self.next_index.max(page.index + 1);

        let before = page.items.len();
        page.items.retain(|item| self.seen.insert(item.id));
        if page.items.len() != before {
            warn!(
                filter = %self.filter,
                page = page.index,
                dropped = before - page.items.len(),
                "Catalog page overlapped earlier pages"
            );
        }

        if !page.items.is_empty() {
            self.pages.push(page);
        }
    }

    /// All items in fetch order.
    pub(crate) fn items(&self) -> Vec<Item> {
        self.pages
            .iter()
            .flat_map(|page| page.items.iter().cloned())
            .collect()
    }

    /// Whether the first page is older than `window`.
    pub(crate) fn is_stale(&self, window: Duration) -> bool {
        let Some(first) = self.pages.first() else {
            return false;
        };
        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        Utc::now() - first.fetched_at > window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketshop_core::Rating;
    use rust_decimal::Decimal;

    fn items(ids: std::ops::Range<i32>) -> Vec<Item> {
        ids.map(|id| Item {
            id: ItemId::new(id),
            title: format!("Item {id}"),
            price: Decimal::ONE,
            description: String::new(),
            category: "electronics".to_string(),
            image: String::new(),
            rating: Rating::default(),
        })
        .collect()
    }

    #[test]
    fn test_full_pages_keep_set_open() {
        let filter = Filter::category("electronics");
        let mut set = PageSet::new(filter.clone());
        set.push(CatalogPage::new(filter.clone(), 0, items(0..10)), 10);
        assert!(!set.is_exhausted());
        assert_eq!(set.next_index(), 1);

        set.push(CatalogPage::new(filter, 1, items(10..14)), 10);
        assert!(set.is_exhausted());
        assert_eq!(set.items().len(), 14);
        assert_eq!(set.pages().len(), 2);
    }

    #[test]
    fn test_empty_page_exhausts_without_being_kept() {
        let mut set = PageSet::new(Filter::All);
        set.push(CatalogPage::new(Filter::All, 0, items(0..10)), 10);
        set.push(CatalogPage::new(Filter::All, 1, Vec::new()), 10);
        assert!(set.is_exhausted());
        assert_eq!(set.pages().len(), 1);
    }

    #[test]
    fn test_overlapping_items_are_dropped() {
        let mut set = PageSet::new(Filter::All);
        set.push(CatalogPage::new(Filter::All, 0, items(0..3)), 3);
        set.push(CatalogPage::new(Filter::All, 1, items(2..5)), 3);
        let ids: Vec<i32> = set.items().iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_fully_overlapping_page_still_advances() {
        let mut set = PageSet::new(Filter::All);
        set.push(CatalogPage::new(Filter::All, 0, items(0..3)), 3);
        set.push(CatalogPage::new(Filter::All, 1, items(0..3)), 3);
        assert_eq!(set.pages().len(), 1);
        assert_eq!(set.next_index(), 2);
        assert!(!set.is_exhausted());

        set.push(CatalogPage::new(Filter::All, 2, items(3..5)), 3);
        assert_eq!(set.next_index(), 3);
        assert!(set.is_exhausted());
        assert_eq!(set.items().len(), 5);
    }

    #[test]
    fn test_staleness() {
        let mut set = PageSet::new(Filter::All);
        assert!(!set.is_stale(Duration::ZERO));

        let mut page = CatalogPage::new(Filter::All, 0, items(0..1));
        page.fetched_at = Utc::now() - TimeDelta::seconds(600);
        set.push(page, 10);
        assert!(set.is_stale(Duration::from_secs(300)));
        assert!(!set.is_stale(Duration::from_secs(3600)));
    }
}
