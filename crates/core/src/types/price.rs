//! Decimal money helpers.
//!
//! Prices are carried as [`Decimal`] in the catalog's single currency. All
//! arithmetic stays in decimal so cart totals never pick up float drift.

use rust_decimal::{Decimal, RoundingStrategy};

/// Price of `quantity` units at `unit_price`.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Format an amount for display (e.g., "$19.99").
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}
