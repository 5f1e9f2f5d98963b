//! Gateway configuration

use cryptdrop_core::VaultConfig;
use serde::{Deserialize, Serialize};

/// Room left in the request body for multipart boundaries and headers
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Storage locations and upload policy
    pub vault: VaultConfig,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// Enable CORS
    pub cors_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let vault = VaultConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_size: body_limit_for(vault.max_upload_size),
            vault,
            cors_enabled: true,
        }
    }
}

impl GatewayConfig {
    /// Gateway over an explicit vault configuration
    pub fn with_vault(vault: VaultConfig) -> Self {
        Self {
            max_body_size: body_limit_for(vault.max_upload_size),
            vault,
            ..Default::default()
        }
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Request body ceiling for a given upload ceiling
pub fn body_limit_for(max_upload_size: u64) -> usize {
    usize::try_from(max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(
            config.max_body_size,
            100 * 1024 * 1024 + MULTIPART_OVERHEAD
        );
        assert!(config.cors_enabled);
    }

    #[test]
    fn test_body_limit_follows_vault() {
        let vault = VaultConfig::default().with_max_upload_size(10);
        let config = GatewayConfig::with_vault(vault);
        assert_eq!(config.max_body_size, 10 + MULTIPART_OVERHEAD);
        assert_eq!(config.vault.max_upload_size, 10);
    }

    #[test]
    fn test_body_limit_saturates() {
        assert_eq!(body_limit_for(u64::MAX), usize::MAX);
    }
}
