//! Cache types for catalog API responses.

use std::sync::Arc;

use pocketshop_core::{Filter, Item};

/// Cache key for full lists and categories.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Items(Filter),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Items(Arc<[Item]>),
    Categories(Arc<[String]>),
}
