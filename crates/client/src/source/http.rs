//! HTTP catalog source.
//!
//! Talks to a fakestore-style REST catalog with `reqwest`. The remote API
//! only returns whole lists, so each filter's full list is fetched once and
//! kept in a `moka` cache for the configured stale window; pages are sliced
//! out of that list.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use pocketshop_core::{Filter, Item, ItemId};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::conversions::{RawProduct, convert_product, convert_products};
use super::window::page_window;
use super::{CatalogError, CatalogSource};
use crate::config::ClientConfig;

/// Client for the remote catalog.
///
/// Cheap to clone; clones share the HTTP client and the list cache.
#[derive(Clone)]
pub struct HttpCatalogSource {
    inner: Arc<HttpCatalogSourceInner>,
}

struct HttpCatalogSourceInner {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    cache: Cache<CacheKey, CacheValue>,
}

impl HttpCatalogSource {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(config.sync.stale_window)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.sync.fetch_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpCatalogSourceInner {
                client,
                base_url: config.api_base_url.clone(),
                timeout: config.sync.fetch_timeout,
                cache,
            }),
        })
    }

    /// Build an endpoint URL from path segments (segments are percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CatalogError::Unavailable(format!(
                    "invalid catalog base URL: {}",
                    self.inner.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self.inner.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout(self.inner.timeout)
            } else {
                CatalogError::Http(e)
            }
        })?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        // The catalog answers unknown ids with an empty 200
        if body.trim().is_empty() || body.trim() == "null" {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }

    /// Full item list for a filter, served from cache within the stale window.
    #[instrument(skip(self), fields(filter = %filter))]
    async fn full_list(&self, filter: &Filter) -> Result<Arc<[Item]>, CatalogError> {
        let cache_key = CacheKey::Items(filter.clone());

        if let Some(CacheValue::Items(items)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for item list");
            return Ok(items);
        }

        let url = match filter {
            Filter::All => self.endpoint(&["products"])?,
            Filter::Category(name) => self.endpoint(&["products", "category", name.as_str()])?,
        };
        let raw: Vec<RawProduct> = self.get_json(url).await?;
        let items: Arc<[Item]> = convert_products(raw).into();
        debug!(count = items.len(), "Fetched full item list");

        self.inner
            .cache
            .insert(cache_key, CacheValue::Items(Arc::clone(&items)))
            .await;

        Ok(items)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_page(
        &self,
        filter: &Filter,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Item>, CatalogError> {
        let items = self.full_list(filter).await?;
        Ok(page_window(&*items, page, page_size))
    }

    #[instrument(skip(self))]
    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories.to_vec());
        }

        let categories: Vec<String> = self
            .get_json(self.endpoint(&["products", "categories"])?)
            .await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone().into()),
            )
            .await;

        Ok(categories)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn fetch_item(&self, id: ItemId) -> Result<Item, CatalogError> {
        let id = id.to_string();
        let raw: RawProduct = self
            .get_json(self.endpoint(&["products", id.as_str()])?)
            .await?;
        Ok(convert_product(raw)?)
    }

    async fn invalidate(&self, filter: &Filter) {
        self.inner
            .cache
            .invalidate(&CacheKey::Items(filter.clone()))
            .await;
    }
}
