//! Detail view quantity reconciliation.
//!
//! Opening an item that is already in the cart seeds the quantity control
//! with the cart's quantity, and confirming replaces that quantity instead
//! of adding to it.

use pocketshop_core::{Item, ItemId};
use tracing::{debug, instrument};

use crate::store::CartStore;

/// Whether the item was in the cart when the detail view opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailMode {
    /// Not in the cart; confirm adds a new line.
    Fresh,
    /// Already in the cart; confirm replaces the line's quantity.
    EditingExisting,
}

/// What a confirm did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Added { quantity: u32 },
    Updated { quantity: u32 },
}

/// Editable quantity for one item's detail view.
#[derive(Debug, Clone)]
pub struct DetailSession {
    item: Item,
    mode: DetailMode,
    quantity: u32,
}

impl DetailSession {
    /// Open a session for `item`, seeded from the cart.
    #[must_use]
    pub fn open(store: &CartStore, item: Item) -> Self {
        let in_cart = store.quantity_in_cart(item.id);
        let (mode, quantity) = if in_cart == 0 {
            (DetailMode::Fresh, 1)
        } else {
            (DetailMode::EditingExisting, in_cart)
        };
        debug!(item_id = %item.id, ?mode, quantity, "Opened detail session");
        Self {
            item,
            mode,
            quantity,
        }
    }

    #[must_use]
    pub const fn item(&self) -> &Item {
        &self.item
    }

    #[must_use]
    pub const fn item_id(&self) -> ItemId {
        self.item.id
    }

    #[must_use]
    pub const fn mode(&self) -> DetailMode {
        self.mode
    }

    /// The displayed quantity, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    pub const fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Lower the displayed quantity, never below 1.
    pub fn decrement(&mut self) {
        self.quantity = self.quantity.saturating_sub(1).max(1);
    }

    /// Set the displayed quantity, clamped to at least 1.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    /// Apply the displayed quantity to the cart.
    ///
    /// Confirming twice with the same quantity leaves the cart as after the
    /// first confirm in editing mode. A fresh session switches to editing
    /// after its first confirm.
    #[instrument(skip(self, store), fields(item_id = %self.item.id, quantity = self.quantity))]
    pub fn confirm(&mut self, store: &CartStore) -> ConfirmOutcome {
        let quantity = self.quantity;
        match self.mode {
            DetailMode::EditingExisting if store.quantity_in_cart(self.item.id) > 0 => {
                store.set_quantity(self.item.id, i64::from(quantity));
                ConfirmOutcome::Updated { quantity }
            }
            DetailMode::EditingExisting | DetailMode::Fresh => {
                store.add_to_cart(&self.item, quantity);
                self.mode = DetailMode::EditingExisting;
                ConfirmOutcome::Added { quantity }
            }
        }
    }
}
