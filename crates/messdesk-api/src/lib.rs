pub mod auth;
pub mod authority;
pub mod complaints;
pub mod error;
pub mod files;
pub mod issues;
pub mod middleware;

use crate::error::ApiError;

/// Runs a rusqlite-backed core operation off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> messdesk_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {}", e);
            ApiError::from(messdesk_core::Error::Internal(anyhow::anyhow!(
                "background task failed"
            )))
        })?
        .map_err(ApiError::from)
}
