pub mod access;
pub mod auth;
pub mod equipment;
pub mod error;
pub mod government;
pub mod land;
pub mod marketplace;
pub mod messages;
pub mod middleware;
pub mod notify;
pub mod policy;
pub mod subsidy;

use anyhow::anyhow;

use crate::error::ApiError;

/// Run a blocking storage closure off the async runtime (rusqlite calls hold
/// a mutex and touch disk).
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Storage(anyhow!("blocking task join error: {}", e)))?
        .map_err(ApiError::Storage)
}
