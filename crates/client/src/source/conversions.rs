//! Raw catalog payload to [`Item`] conversion.

use pocketshop_core::{Item, ItemId, Rating};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const MAX_RATE: f64 = 5.0;

/// A product exactly as the catalog API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: i32,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
    pub rating: Option<RawRating>,
}

/// Rating block of a [`RawProduct`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawRating {
    pub rate: f64,
    pub count: i64,
}

/// Reasons a raw product is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("item {0} has a negative price")]
    NegativePrice(i32),
    #[error("item {id} has rating {rate} outside 0-5")]
    RatingOutOfRange { id: i32, rate: f64 },
    #[error("item {id} has invalid rating count {count}")]
    InvalidRatingCount { id: i32, count: i64 },
}

/// Convert a raw product into a typed [`Item`].
///
/// # Errors
///
/// Returns `ConversionError` if the price is negative or the rating is out of range.
pub fn convert_product(raw: RawProduct) -> Result<Item, ConversionError> {
    if raw.price < Decimal::ZERO {
        return Err(ConversionError::NegativePrice(raw.id));
    }

    let rating = match raw.rating {
        Some(r) => {
            if !(0.0..=MAX_RATE).contains(&r.rate) {
                return Err(ConversionError::RatingOutOfRange {
                    id: raw.id,
                    rate: r.rate,
                });
            }
            let count = u32::try_from(r.count).map_err(|_| ConversionError::InvalidRatingCount {
                id: raw.id,
                count: r.count,
            })?;
            Rating {
                rate: r.rate,
                count,
            }
        }
        None => Rating::default(),
    };

    Ok(Item {
        id: ItemId::new(raw.id),
        title: raw.title,
        price: raw.price,
        description: raw.description,
        category: raw.category,
        image: raw.image,
        rating,
    })
}

/// Convert a list of raw products, skipping (and logging) invalid entries.
#[must_use]
pub fn convert_products(raw: Vec<RawProduct>) -> Vec<Item> {
    raw.into_iter()
        .filter_map(|product| match convert_product(product) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "Skipping invalid catalog item");
                None
            }
        })
        .collect()
}
