//! Catalog item and filter types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ItemId;

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rating {
    /// Average score on a 0-5 scale.
    pub rate: f64,
    /// Number of ratings behind the average.
    pub count: u32,
}

/// A catalog item.
///
/// Items are immutable once fetched. Cart lines and favorites hold their own
/// copy, so nothing points back into the catalog cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// Unit price, serialized as a JSON number to match the catalog payload.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    pub category: String,
    /// Image URL.
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

/// The active category selection for catalog paging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    /// No category constraint.
    #[default]
    All,
    /// Items tagged with one category.
    Category(String),
}

impl Filter {
    /// Create a category filter.
    #[must_use]
    pub fn category(name: impl Into<String>) -> Self {
        Self::Category(name.into())
    }

    /// The category name, or `None` for [`Filter::All`].
    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Category(name) => Some(name),
        }
    }
}

impl From<Option<String>> for Filter {
    fn from(category: Option<String>) -> Self {
        category.map_or(Self::All, Self::Category)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Category(name) => write!(f, "category:{name}"),
        }
    }
}
