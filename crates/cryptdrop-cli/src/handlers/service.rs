//! Service-level handlers (health, info)

use super::blocking;
use crate::{ApiError, AppState};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `GET /api/info`
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub system: String,
    pub version: String,
    pub encryption: String,
    pub files_count: usize,
    pub keys_count: usize,
}

/// GET / and HEAD / - Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /api/info - Service description and storage counts
pub async fn service_info(State(state): State<Arc<AppState>>) -> Result<Json<ServiceInfo>, ApiError> {
    let vault = Arc::clone(&state.vault);
    let stats = blocking(move || vault.stats()).await?;

    Ok(Json(ServiceInfo {
        system: "CryptDrop".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        encryption: cryptdrop_crypto::ALGORITHM.to_string(),
        files_count: stats.files_count,
        keys_count: stats.keys_count,
    }))
}
