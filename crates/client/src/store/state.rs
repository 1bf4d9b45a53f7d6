//! In-memory cart, favorites and browse state.

use indexmap::IndexMap;
use pocketshop_core::{CartLine, Item, ItemId};
use rust_decimal::Decimal;

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    Rating,
}

/// Transient browse UI state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrowseState {
    pub search_text: String,
    pub sort_mode: SortMode,
}

/// Everything the store holds.
///
/// Cart lines and favorites keep insertion order and are keyed by item id,
/// so an item appears at most once in each.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreState {
    cart: IndexMap<ItemId, CartLine>,
    favorites: IndexMap<ItemId, Item>,
    browse: BrowseState,
}

impl StoreState {
    pub(crate) fn from_parts(
        cart: IndexMap<ItemId, CartLine>,
        favorites: IndexMap<ItemId, Item>,
    ) -> Self {
        Self {
            cart,
            favorites,
            browse: BrowseState::default(),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Cart lines in insertion order.
    pub fn cart_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.cart.values()
    }

    /// Favorites in insertion order.
    pub fn favorites(&self) -> impl Iterator<Item = &Item> {
        self.favorites.values()
    }

    #[must_use]
    pub fn line(&self, item_id: ItemId) -> Option<&CartLine> {
        self.cart.get(&item_id)
    }

    /// Quantity of `item_id` in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_in_cart(&self, item_id: ItemId) -> u32 {
        self.cart.get(&item_id).map_or(0, |line| line.quantity)
    }

    /// Σ(price × quantity) over all lines.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.cart.values().map(CartLine::total).sum()
    }

    /// Σ(quantity) over all lines; the badge count.
    #[must_use]
    pub fn cart_item_count(&self) -> u32 {
        self.cart
            .values()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.cart.len()
    }

    /// Total for one line, 0 if absent.
    #[must_use]
    pub fn line_total(&self, item_id: ItemId) -> Decimal {
        self.cart.get(&item_id).map_or(Decimal::ZERO, CartLine::total)
    }

    #[must_use]
    pub fn is_favorite(&self, item_id: ItemId) -> bool {
        self.favorites.contains_key(&item_id)
    }

    #[must_use]
    pub fn favorite_count(&self) -> usize {
        self.favorites.len()
    }

    #[must_use]
    pub const fn browse(&self) -> &BrowseState {
        &self.browse
    }

    // =========================================================================
    // Mutations (each returns whether anything changed)
    // =========================================================================

    pub(crate) fn add_to_cart(&mut self, item: &Item, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        match self.cart.get_mut(&item.id) {
            Some(line) => {
                let before = line.quantity;
                line.quantity = line.quantity.saturating_add(quantity);
                line.quantity != before
            }
            None => {
                self.cart
                    .insert(item.id, CartLine::new(item.clone(), quantity));
                true
            }
        }
    }

    pub(crate) fn set_quantity(&mut self, item_id: ItemId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_from_cart(item_id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.cart.get_mut(&item_id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn decrement(&mut self, item_id: ItemId) -> bool {
        match self.cart.get(&item_id).map(|line| line.quantity) {
            Some(quantity) => self.set_quantity(item_id, i64::from(quantity) - 1),
            None => false,
        }
    }

    pub(crate) fn remove_from_cart(&mut self, item_id: ItemId) -> bool {
        self.cart.shift_remove(&item_id).is_some()
    }

    pub(crate) fn clear_cart(&mut self) -> bool {
        let changed = !self.cart.is_empty();
        self.cart.clear();
        changed
    }

    pub(crate) fn add_favorite(&mut self, item: &Item) -> bool {
        if self.favorites.contains_key(&item.id) {
            return false;
        }
        self.favorites.insert(item.id, item.clone());
        true
    }

    pub(crate) fn remove_favorite(&mut self, item_id: ItemId) -> bool {
        self.favorites.shift_remove(&item_id).is_some()
    }

    pub(crate) fn clear_favorites(&mut self) -> bool {
        let changed = !self.favorites.is_empty();
        self.favorites.clear();
        changed
    }

    pub(crate) fn set_search_text(&mut self, text: &str) -> bool {
        if self.browse.search_text == text {
            return false;
        }
        text.clone_into(&mut self.browse.search_text);
        true
    }

    pub(crate) fn set_sort_mode(&mut self, mode: SortMode) -> bool {
        if self.browse.sort_mode == mode {
            return false;
        }
        self.browse.sort_mode = mode;
        true
    }
}
