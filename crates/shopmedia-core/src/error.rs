//! Error types module
//!
//! Top-level error enum for callers embedding the asset-storage subsystem.
//! The storage crate defines its own `StorageError` for backend operations;
//! this type exists so business-entity handlers can funnel asset failures
//! into one error path alongside their own.

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssetError {
    /// Whether the error is attributable to the caller's input rather than
    /// the storage layer itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AssetError::Validation(_) | AssetError::NotFound(_) | AssetError::Conflict(_)
        )
    }
}
