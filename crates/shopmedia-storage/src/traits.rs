//! Storage abstraction trait
//!
//! This module defines the AssetBackend trait that both storage backends
//! implement, and the error type shared by all storage operations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use shopmedia_core::{AssetRecord, StorageKind, UploadedFile};
use shopmedia_processing::ValidationError;

use crate::keys::StorageSlot;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Rejected before any backend call.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Funnel storage failures into the caller-facing error taxonomy so that
/// business-entity handlers deal with one error type.
impl From<StorageError> for shopmedia_core::AssetError {
    fn from(err: StorageError) -> Self {
        use shopmedia_core::AssetError;
        match err {
            StorageError::Validation(e) => AssetError::Validation(e.to_string()),
            StorageError::InvalidKey(m) => AssetError::Validation(m),
            StorageError::UploadFailed(m) => AssetError::Upload(m),
            StorageError::NotFound(m) => AssetError::NotFound(m),
            StorageError::Conflict(m) => AssetError::Conflict(m),
            StorageError::ConfigError(m) => AssetError::Config(m),
            StorageError::IoError(e) => AssetError::Io(e),
            StorageError::DownloadFailed(m)
            | StorageError::DeleteFailed(m)
            | StorageError::BackendError(m) => AssetError::Internal(m),
        }
    }
}

/// Storage backend contract
///
/// Both backends (local filesystem, remote hosted media service) implement
/// this trait. The orchestrator works entirely in terms of it, which is what
/// keeps every caller backend-agnostic.
///
/// `store` must be all-or-nothing for the original: an `AssetRecord` is only
/// returned once the original bytes are durably stored. Derived variants are
/// best-effort — a variant that fails to materialize is omitted from the
/// record, never returned as a broken reference.
#[async_trait]
pub trait AssetBackend: Send + Sync {
    /// Store an uploaded file into the given slot and return the normalized
    /// record. No retries: a failed write fails the whole call once.
    async fn store(&self, file: &UploadedFile, slot: &StorageSlot) -> StorageResult<AssetRecord>;

    /// Read back the original bytes of a stored asset. Used by migration.
    async fn fetch(&self, record: &AssetRecord) -> StorageResult<Vec<u8>>;

    /// Remove the asset's stored bytes (original plus variants).
    ///
    /// Idempotent: removing an already-removed asset returns `Ok(false)`.
    /// Returns `Ok(true)` only when the original existed and everything was
    /// removed this call. Transport failures are returned as errors and
    /// absorbed by the orchestrator's best-effort delete policy.
    async fn remove(&self, record: &AssetRecord) -> StorageResult<bool>;

    /// Resolve the addressable URLs of the asset and its variants.
    ///
    /// Pure: never performs I/O. Local records resolve by path
    /// concatenation, remote records by URL templating over `backend_ref`.
    /// The map always contains `original`; a variant that failed to generate
    /// falls back to the original's URL.
    fn resolve_urls(&self, record: &AssetRecord) -> BTreeMap<String, String>;

    /// The backend kind this implementation produces.
    fn kind(&self) -> StorageKind;
}
