//! Application state

use crate::config::GatewayConfig;
use cryptdrop_core::Vault;
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Encrypted file store
    pub vault: Arc<Vault>,
}

impl AppState {
    /// Create a new application state, opening the vault directories
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let vault = Arc::new(Vault::new(config.vault.clone())?);
        info!(
            allowed = %config.vault.allowed_extensions_display(),
            "Upload policy loaded"
        );
        Ok(Self { config, vault })
    }
}
