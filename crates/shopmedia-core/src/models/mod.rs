//! Data models for the asset-storage subsystem
//!
//! These are the shapes flowing across the subsystem boundary: the caller
//! hands in an [`UploadedFile`] plus an [`UploadIntent`], and receives an
//! [`AssetRecord`] to persist on its own entity document.

mod asset;
mod intent;

pub use asset::*;
pub use intent::*;
