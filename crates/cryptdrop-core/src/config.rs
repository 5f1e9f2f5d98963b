//! Vault configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Default upload ceiling (100 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Extensions accepted out of the box
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx", "zip", "csv", "py", "js", "html",
    "css",
];

/// Storage locations and upload policy for a [`crate::Vault`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Directory holding the `.enc` ciphertext blobs
    pub uploads_dir: PathBuf,
    /// Directory holding the `.key` records
    pub keys_dir: PathBuf,
    /// Maximum plaintext size accepted by `upload` (bytes)
    pub max_upload_size: u64,
    /// Lowercase extensions (without the dot) accepted by `upload`
    pub allowed_extensions: BTreeSet<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("uploads"),
            keys_dir: PathBuf::from("keys"),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl VaultConfig {
    /// Default policy rooted at `root/uploads` and `root/keys`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            uploads_dir: root.join("uploads"),
            keys_dir: root.join("keys"),
            ..Default::default()
        }
    }

    /// Set the ciphertext directory
    pub fn with_uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.uploads_dir = dir.into();
        self
    }

    /// Set the key record directory
    pub fn with_keys_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.keys_dir = dir.into();
        self
    }

    /// Set the upload ceiling
    pub fn with_max_upload_size(mut self, max: u64) -> Self {
        self.max_upload_size = max;
        self
    }

    /// Replace the extension allow-list
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    /// Check an extension (case-insensitive, without the dot)
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .contains(&extension.to_ascii_lowercase())
    }

    /// Comma-separated allow-list for error messages
    pub fn allowed_extensions_display(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VaultConfig::default();
        assert_eq!(config.max_upload_size, 100 * 1024 * 1024);
        assert_eq!(config.allowed_extensions.len(), 14);
        assert!(config.is_extension_allowed("txt"));
        assert!(config.is_extension_allowed("PDF"));
        assert!(!config.is_extension_allowed("exe"));
    }

    #[test]
    fn test_with_root() {
        let config = VaultConfig::with_root("/srv/cryptdrop");
        assert_eq!(config.uploads_dir, PathBuf::from("/srv/cryptdrop/uploads"));
        assert_eq!(config.keys_dir, PathBuf::from("/srv/cryptdrop/keys"));
    }

    #[test]
    fn test_allowed_extensions_normalized() {
        let config = VaultConfig::default().with_allowed_extensions([" .TXT", "md", ""]);
        assert_eq!(config.allowed_extensions.len(), 2);
        assert!(config.is_extension_allowed("txt"));
        assert!(config.is_extension_allowed("MD"));
        assert_eq!(config.allowed_extensions_display(), "md, txt");
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = VaultConfig::default().with_max_upload_size(42);
        let json = serde_json::to_string(&config).unwrap();
        let back: VaultConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_upload_size, 42);
        assert_eq!(back.allowed_extensions, config.allowed_extensions);
    }
}
