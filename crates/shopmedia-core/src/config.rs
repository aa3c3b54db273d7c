//! Configuration module
//!
//! Environment-driven configuration for the asset-storage subsystem. The
//! backend choice is resolved here exactly once; the storage factory consumes
//! the parsed value at construction time and the decision is immutable for
//! the process lifetime.

use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE_BYTES,
};
use crate::storage_kind::StorageKind;

/// Asset-storage configuration.
#[derive(Clone, Debug)]
pub struct AssetStorageConfig {
    /// The active backend for new uploads.
    pub backend: StorageKind,
    // Local filesystem backend
    pub local_root: Option<String>,
    pub local_base_url: Option<String>,
    // Remote hosted media service
    pub remote_api_base: Option<String>,
    pub remote_api_key: Option<String>,
    pub remote_delivery_base: Option<String>,
    // Upload validation
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    env_opt(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
}

impl AssetStorageConfig {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let backend = match env_opt("STORAGE_BACKEND") {
            Some(v) => StorageKind::from_str(&v)?,
            None => StorageKind::Local,
        };

        let max_file_size_bytes = match env_opt("MAX_FILE_SIZE_BYTES") {
            Some(v) => v
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_FILE_SIZE_BYTES: {}", e))?,
            None => DEFAULT_MAX_FILE_SIZE_BYTES,
        };

        let config = Self {
            backend,
            local_root: env_opt("LOCAL_STORAGE_PATH"),
            local_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            remote_api_base: env_opt("MEDIA_API_BASE"),
            remote_api_key: env_opt("MEDIA_API_KEY"),
            remote_delivery_base: env_opt("MEDIA_DELIVERY_BASE"),
            max_file_size_bytes,
            allowed_extensions: env_list("ALLOWED_EXTENSIONS", DEFAULT_ALLOWED_EXTENSIONS),
            allowed_content_types: env_list(
                "ALLOWED_CONTENT_TYPES",
                DEFAULT_ALLOWED_CONTENT_TYPES,
            ),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the active backend has everything it needs. The inactive
    /// backend may stay unconfigured; only migrate/delete calls that reach it
    /// will then fail, with a configuration error.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.backend {
            StorageKind::Local => {
                if self.local_root.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_PATH required for the local backend");
                }
            }
            StorageKind::Remote => {
                if self.remote_api_base.is_none() || self.remote_delivery_base.is_none() {
                    anyhow::bail!(
                        "MEDIA_API_BASE and MEDIA_DELIVERY_BASE required for the remote backend"
                    );
                }
            }
        }
        if self.max_file_size_bytes == 0 {
            anyhow::bail!("MAX_FILE_SIZE_BYTES must be greater than zero");
        }
        Ok(())
    }

    /// A config suitable for local-backend operation rooted at `root`.
    pub fn local(root: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            backend: StorageKind::Local,
            local_root: Some(root.into()),
            local_base_url: Some(base_url.into()),
            remote_api_base: None,
            remote_api_key: None,
            remote_delivery_base: None,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
