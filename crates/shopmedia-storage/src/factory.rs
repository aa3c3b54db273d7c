//! Storage factory: builds the configured backends and wires them into the
//! orchestrator. Each backend is constructed when its configuration is
//! present and its feature is compiled in; the active backend must end up
//! available or construction fails with a configuration error.

use std::sync::Arc;

use shopmedia_core::AssetStorageConfig;
use shopmedia_processing::MediaValidator;

use crate::service::AssetStorage;
use crate::traits::{AssetBackend, StorageError, StorageResult};

pub async fn create_asset_storage(config: &AssetStorageConfig) -> StorageResult<AssetStorage> {
    config
        .validate()
        .map_err(|e| StorageError::ConfigError(e.to_string()))?;

    let local = build_local(config).await?;
    let remote = build_remote(config)?;
    let validator = MediaValidator::from_config(config);

    let storage = AssetStorage::new(config.backend, local, remote, validator)?;

    tracing::info!(
        backend = %config.backend,
        local_available = storage_flag(config.local_root.is_some(), cfg!(feature = "storage-local")),
        remote_available = storage_flag(config.remote_api_base.is_some(), cfg!(feature = "storage-remote")),
        "Asset storage initialized"
    );

    Ok(storage)
}

fn storage_flag(configured: bool, compiled: bool) -> bool {
    configured && compiled
}

#[cfg(feature = "storage-local")]
async fn build_local(
    config: &AssetStorageConfig,
) -> StorageResult<Option<Arc<dyn AssetBackend>>> {
    match &config.local_root {
        Some(root) => {
            let base_url = config.local_base_url.clone().unwrap_or_default();
            let backend = crate::local::LocalAssetBackend::new(root.clone(), base_url).await?;
            tracing::info!(root = %root, "Local storage backend ready");
            Ok(Some(Arc::new(backend)))
        }
        None => Ok(None),
    }
}

#[cfg(not(feature = "storage-local"))]
async fn build_local(
    config: &AssetStorageConfig,
) -> StorageResult<Option<Arc<dyn AssetBackend>>> {
    if config.local_root.is_some() {
        tracing::warn!("Local storage configured but the storage-local feature is not enabled");
    }
    Ok(None)
}

#[cfg(feature = "storage-remote")]
fn build_remote(config: &AssetStorageConfig) -> StorageResult<Option<Arc<dyn AssetBackend>>> {
    match (&config.remote_api_base, &config.remote_delivery_base) {
        (Some(api_base), Some(delivery_base)) => {
            let backend = crate::remote::RemoteAssetBackend::new(
                api_base.clone(),
                delivery_base.clone(),
                config.remote_api_key.clone(),
            )?;
            tracing::info!(api_base = %api_base, "Remote storage backend ready");
            Ok(Some(Arc::new(backend)))
        }
        _ => Ok(None),
    }
}

#[cfg(not(feature = "storage-remote"))]
fn build_remote(config: &AssetStorageConfig) -> StorageResult<Option<Arc<dyn AssetBackend>>> {
    if config.remote_api_base.is_some() {
        tracing::warn!("Remote storage configured but the storage-remote feature is not enabled");
    }
    Ok(None)
}
