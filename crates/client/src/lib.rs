//! Pocketshop client engine.
//!
//! Client-side data/state synchronization for a catalog-browsing app:
//!
//! - [`catalog`] - Paginated, filter-scoped catalog cache with placeholder
//!   retention and stale-response suppression
//! - [`store`] - Persistent cart/favorites store with derived aggregates
//! - [`detail`] - Detail view quantity reconciliation against the cart
//! - [`source`] - Catalog source abstraction and the HTTP implementation
//! - [`config`] - Environment-driven configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pocketshop_client::{CartStore, CatalogCache, FileStore, HttpCatalogSource};
//!
//! let config = ClientConfig::from_env()?;
//! let source = Arc::new(HttpCatalogSource::new(&config)?);
//! let catalog = CatalogCache::new(source, config.sync.clone());
//! catalog.set_filter(Filter::category("electronics")).await;
//!
//! let store = CartStore::restore(Arc::new(FileStore::new(&config.data_dir)?));
//! store.add_to_cart(&catalog.flattened_items()[0], 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod detail;
pub mod source;
pub mod store;

pub use catalog::{CatalogCache, CatalogPage, CatalogSnapshot};
pub use config::{ClientConfig, ConfigError, SyncConfig};
pub use detail::{ConfirmOutcome, DetailMode, DetailSession};
pub use source::{CatalogError, CatalogSource, HttpCatalogSource};
pub use store::{
    BrowseState, CartStore, FileStore, KeyValueStore, MemoryStore, PersistedSnapshot, Selector,
    SortMode, StorageError, StoreState,
};

pub use pocketshop_core::{CartLine, Filter, Item, ItemId, Rating};
