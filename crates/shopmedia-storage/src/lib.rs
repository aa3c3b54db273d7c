//! Shopmedia Storage Library
//!
//! This crate provides the asset-storage abstraction: one
//! upload/delete/resolve/migrate contract over two interchangeable backends,
//! a local filesystem and a remote hosted media service.
//!
//! # Local key format
//!
//! Locally stored assets use time-partitioned relative keys:
//!
//! - original: `uploads/{entity_type}/{year}/{month}/temp/{stem}_{millis}_{rand}.{ext}`
//! - variants: same directory, `{stem}_{millis}_{rand}_{variant}.{ext}`
//!
//! The `uploads/{entity_type}/{year}/{month}/` partitioning is a
//! compatibility commitment: already-stored assets live under it. Keys must
//! not contain `..` or a leading `/`. Key and identifier generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-remote")]
pub mod remote;
pub mod service;
pub mod traits;

// Re-export commonly used types
pub use factory::create_asset_storage;
pub use keys::StorageSlot;
#[cfg(feature = "storage-local")]
pub use local::LocalAssetBackend;
#[cfg(feature = "storage-remote")]
pub use remote::RemoteAssetBackend;
pub use service::AssetStorage;
pub use shopmedia_core::StorageKind;
pub use traits::{AssetBackend, StorageError, StorageResult};
