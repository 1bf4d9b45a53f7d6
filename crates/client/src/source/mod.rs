//! Catalog source abstraction.
//!
//! # Architecture
//!
//! - [`CatalogSource`] is the seam between the catalog cache and the remote
//!   catalog. Tests script it; production uses [`HttpCatalogSource`].
//! - The remote catalog has no server-side paging. Pages are windows sliced
//!   out of the full per-filter list (see [`page_window`]).
//! - Errors carry a transient/permanent classification so the cache can
//!   decide whether to retry.

mod cache;
mod conversions;
mod http;
mod window;

use std::time::Duration;

use async_trait::async_trait;
use pocketshop_core::{Filter, Item, ItemId};
use thiserror::Error;

pub use conversions::{ConversionError, RawProduct, RawRating, convert_product, convert_products};
pub use http::HttpCatalogSource;
pub use window::page_window;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Client-side timeout elapsed.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Payload did not describe a valid item.
    #[error("Invalid catalog data: {0}")]
    Conversion(#[from] ConversionError),

    /// Source temporarily unable to serve.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) | Self::Timeout(_) | Self::Unavailable(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Parse(_) | Self::NotFound(_) | Self::Conversion(_) => false,
        }
    }
}

/// Remote catalog consumed by the cache.
///
/// `fetch_page` returns at most `page_size` items. Returning fewer than
/// `page_size` signals end of data for that filter.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch window `page` of the item list selected by `filter`.
    async fn fetch_page(
        &self,
        filter: &Filter,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Item>, CatalogError>;

    /// Fetch the list of category tags.
    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError>;

    /// Fetch a single item.
    async fn fetch_item(&self, id: ItemId) -> Result<Item, CatalogError>;

    /// Drop anything cached for `filter` so the next fetch hits the remote.
    async fn invalidate(&self, _filter: &Filter) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(CatalogError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(CatalogError::RateLimited(3).is_transient());
        assert!(CatalogError::Unavailable("offline".to_string()).is_transient());
        assert!(
            CatalogError::Status {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !CatalogError::Status {
                status: 404,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!CatalogError::NotFound("item 9".to_string()).is_transient());
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");

        let err = CatalogError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }
}
