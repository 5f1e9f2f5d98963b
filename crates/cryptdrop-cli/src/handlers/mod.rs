//! HTTP request handlers

pub mod files;
pub mod service;

pub use files::*;
pub use service::*;

use crate::ApiError;

/// Run a synchronous vault call on the blocking pool
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> cryptdrop_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}
