//! Server startup and lifecycle

use crate::{AppState, GatewayConfig, routes};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the gateway server until Ctrl-C
pub async fn run_server(config: GatewayConfig) -> anyhow::Result<()> {
    run_server_with_shutdown(config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await
}

/// Run server with graceful shutdown
pub async fn run_server_with_shutdown(
    config: GatewayConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone())?);
    let app = routes::create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("CryptDrop listening on http://{}", listener.local_addr()?);
    info!(
        uploads = %config.vault.uploads_dir.display(),
        keys = %config.vault.keys_dir.display(),
        "Encrypted storage ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
