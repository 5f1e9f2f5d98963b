//! CryptDrop server - encrypted file storage over HTTP

use clap::Parser;
use cryptdrop_cli::{GatewayConfig, run_server};
use cryptdrop_core::{DEFAULT_MAX_UPLOAD_SIZE, VaultConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cryptdrop-server")]
#[command(about = "Encrypted file storage server")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "CRYPTDROP_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "5000", env = "CRYPTDROP_PORT")]
    port: u16,

    /// Directory for encrypted blobs
    #[arg(long, default_value = "uploads", env = "CRYPTDROP_UPLOADS_DIR")]
    uploads_dir: PathBuf,

    /// Directory for key records
    #[arg(long, default_value = "keys", env = "CRYPTDROP_KEYS_DIR")]
    keys_dir: PathBuf,

    /// Maximum upload size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_SIZE, env = "CRYPTDROP_MAX_UPLOAD_SIZE")]
    max_upload_size: u64,

    /// Comma-separated list of accepted file extensions
    #[arg(long, value_delimiter = ',', env = "CRYPTDROP_ALLOWED_EXTENSIONS")]
    allowed_extensions: Option<Vec<String>>,

    /// Disable CORS headers
    #[arg(long, env = "CRYPTDROP_NO_CORS")]
    no_cors: bool,

    /// Enable debug logging
    #[arg(short, long, env = "CRYPTDROP_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "cryptdrop_cli={level},cryptdrop_core={level},tower_http=debug",
                    level = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CryptDrop on {}:{}", args.host, args.port);

    let mut vault = VaultConfig::default()
        .with_uploads_dir(args.uploads_dir)
        .with_keys_dir(args.keys_dir)
        .with_max_upload_size(args.max_upload_size);
    if let Some(extensions) = args.allowed_extensions {
        vault = vault.with_allowed_extensions(extensions);
    }

    if args.no_cors {
        tracing::warn!("CORS is disabled");
    }

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        cors_enabled: !args.no_cors,
        ..GatewayConfig::with_vault(vault)
    };

    run_server(config).await
}
