//! Cart line type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ItemId;
use super::item::Item;
use super::price::line_total;

/// One (item, quantity) record in the cart.
///
/// The store never keeps a line with quantity 0; it removes the line instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Snapshot of the item at the time it was added.
    pub item: Item,
    pub quantity: u32,
}

impl CartLine {
    /// Create a new cart line.
    #[must_use]
    pub const fn new(item: Item, quantity: u32) -> Self {
        Self { item, quantity }
    }

    /// The item this line refers to.
    #[must_use]
    pub const fn item_id(&self) -> ItemId {
        self.item.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.item.price, self.quantity)
    }
}
