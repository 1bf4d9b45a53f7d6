//! Subcommand implementations.

pub mod cart;
pub mod catalog;
pub mod detail;
pub mod favorites;

use std::sync::Arc;

use pocketshop_client::{
    CartStore, CatalogCache, CatalogError, ClientConfig, ConfigError, FileStore, HttpCatalogSource,
    Item, StorageError,
};
use pocketshop_core::format_price;
use thiserror::Error;
use tracing::debug;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A paging fetch failed after retries; the cache keeps the error.
    #[error("Catalog fetch failed: {0}")]
    Fetch(Arc<CatalogError>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Engine handles shared by every command.
pub struct Context {
    pub catalog: CatalogCache,
    pub store: CartStore,
}

impl Context {
    /// Wire the HTTP catalog and the file-backed cart from the environment.
    pub fn from_env() -> Result<Self, CommandError> {
        let config = ClientConfig::from_env()?;
        debug!(
            api = %config.api_base_url,
            data_dir = %config.data_dir.display(),
            "Loaded configuration"
        );

        let source = Arc::new(HttpCatalogSource::new(&config)?);
        let catalog = CatalogCache::new(source, config.sync.clone());
        let storage = Arc::new(FileStore::new(&config.data_dir)?);
        let store = CartStore::restore(storage);

        Ok(Self { catalog, store })
    }
}

/// One-line listing of an item.
fn item_row(item: &Item) -> String {
    format!(
        "{:>4}  {:<48.48}  {:>10}  {}",
        item.id,
        item.title,
        format_price(item.price),
        item.category
    )
}
