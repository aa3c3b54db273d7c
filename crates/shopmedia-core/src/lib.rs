//! Shopmedia Core Library
//!
//! This crate provides the domain models, error types, configuration and
//! variant definitions shared by the asset-storage components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_kind;
pub mod variants;

// Re-export commonly used types
pub use config::AssetStorageConfig;
pub use error::AssetError;
pub use models::{
    AssetMetadata, AssetRecord, DeleteOutcome, EntityType, UploadIntent, UploadedFile,
};
pub use storage_kind::StorageKind;
pub use variants::{VariantName, VariantSpec, VARIANT_SPECS};
