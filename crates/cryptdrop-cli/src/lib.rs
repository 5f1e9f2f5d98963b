//! # CryptDrop Gateway
//!
//! HTTP front end and offline tooling for CryptDrop encrypted file storage.
//!
//! This crate provides:
//! - **HTTP API**: upload, list, download (plain, encrypted, key) and delete
//! - **Decryption tool**: recover a file from its `.enc` blob and key file
//!   without the server
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! │              (browser forms, curl)                  │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                 CryptDrop Gateway                   │
//! ├─────────────────────────────────────────────────────┤
//! │   Request ID  │  Access Log  │  Body Limit  │ CORS  │
//! ├─────────────────────────────────────────────────────┤
//! │                  File Handlers                      │
//! ├─────────────────────────────────────────────────────┤
//! │                  cryptdrop-core                     │
//! │          (Vault, Catalog, Blob and Key stores)      │
//! ├─────────────────────────────────────────────────────┤
//! │                 cryptdrop-crypto                    │
//! │             (AES-256-GCM envelopes)                 │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod decrypt_tool;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::{ApiError, ErrorCode};
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
