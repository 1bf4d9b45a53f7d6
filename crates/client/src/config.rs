//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `POCKETSHOP_API_URL` - Catalog base URL (default: <https://fakestoreapi.com>)
//! - `POCKETSHOP_DATA_DIR` - Directory for persisted cart/favorites
//!   (default: platform data dir + `/pocketshop`)
//! - `POCKETSHOP_PAGE_SIZE` - Items per catalog page (default: 10)
//! - `POCKETSHOP_MAX_RETRIES` - Automatic retries per failed fetch (default: 2)
//! - `POCKETSHOP_STALE_WINDOW_SECS` - How long a fetched list is reused (default: 300)
//! - `POCKETSHOP_FETCH_TIMEOUT_SECS` - Client-side catalog timeout (default: 10)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "https://fakestoreapi.com";
const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_STALE_WINDOW_SECS: u64 = 300;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Query behavior shared by the catalog cache and the catalog source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Items per page.
    pub page_size: usize,
    /// Automatic retries after the first failed attempt.
    pub max_retries: u32,
    /// How long a fetched list may be reused before refetching.
    pub stale_window: Duration,
    /// Client-side timeout for one catalog call.
    pub fetch_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            stale_window: Duration::from_secs(DEFAULT_STALE_WINDOW_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Catalog API base URL
    pub api_base_url: Url,
    /// Directory holding persisted state
    pub data_dir: PathBuf,
    /// Paging, retry and staleness settings
    pub sync: SyncConfig,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if no
    /// data directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = Url::parse(&get_env_or_default("POCKETSHOP_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("POCKETSHOP_API_URL".to_string(), e.to_string()))?;

        let data_dir = match get_optional_env("POCKETSHOP_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|dir| dir.join("pocketshop"))
                .ok_or_else(|| ConfigError::MissingEnvVar("POCKETSHOP_DATA_DIR".to_string()))?,
        };

        let sync = SyncConfig::from_env()?;

        Ok(Self {
            api_base_url,
            data_dir,
            sync,
        })
    }
}

impl SyncConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let page_size = parse_env_or("POCKETSHOP_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "POCKETSHOP_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            page_size,
            max_retries: parse_env_or("POCKETSHOP_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            stale_window: Duration::from_secs(parse_env_or(
                "POCKETSHOP_STALE_WINDOW_SECS",
                DEFAULT_STALE_WINDOW_SECS,
            )?),
            fetch_timeout: Duration::from_secs(parse_env_or(
                "POCKETSHOP_FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
        })
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
