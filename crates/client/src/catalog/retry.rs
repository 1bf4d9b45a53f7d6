//! Bounded retry with a client-side timeout.

use std::future::Future;

use tracing::{error, warn};

use crate::config::SyncConfig;
use crate::source::CatalogError;

/// Run `op` until it succeeds, fails permanently, or `max_retries` retries
/// have been spent.
///
/// Each attempt is bounded by `fetch_timeout`; an elapsed timeout counts as
/// a transient failure. `still_current` is checked before every retry so a
/// superseded request stops retrying early.
pub(crate) async fn with_retry<T, F, Fut>(
    config: &SyncConfig,
    operation: &str,
    still_current: impl Fn() -> bool,
    mut op: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt: u32 = 0;
    loop {
        let outcome = tokio::time::timeout(config.fetch_timeout, op())
            .await
            .unwrap_or(Err(CatalogError::Timeout(config.fetch_timeout)));

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < config.max_retries && still_current() => {
                attempt += 1;
                warn!(operation, attempt, error = %e, "Catalog fetch failed, retrying");
            }
            Err(e) => {
                if e.is_transient() && attempt >= config.max_retries {
                    error!(operation, attempts = attempt + 1, error = %e, "Catalog fetch retries exhausted");
                }
                return Err(e);
            }
        }
    }
}
