//! HTTP route definitions

use crate::{AppState, handlers, middleware};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Service endpoints
        .route("/", get(handlers::health_check).head(handlers::health_check))
        .route("/api/info", get(handlers::service_info))
        // File endpoints
        .route("/upload", post(handlers::upload_file))
        .route("/files", get(handlers::list_files))
        .route("/files/{id}", axum::routing::delete(handlers::delete_file))
        .route("/delete/{id}", post(handlers::delete_file))
        .route("/download/{id}", get(handlers::download_file))
        .route("/download-encrypted/{id}", get(handlers::download_encrypted))
        .route("/download-key/{id}", get(handlers::download_key))
        // Apply middleware
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let router = if state.config.cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
