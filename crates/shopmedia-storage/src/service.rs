//! The storage orchestrator: one upload/delete/resolve/migrate contract over
//! whichever backends are configured.

use std::collections::BTreeMap;
use std::sync::Arc;

use shopmedia_core::{
    AssetRecord, DeleteOutcome, EntityType, StorageKind, UploadIntent, UploadedFile, VariantName,
};
use shopmedia_processing::MediaValidator;

use crate::keys;
use crate::traits::{AssetBackend, StorageError, StorageResult};

/// Backend-agnostic asset storage.
///
/// The active backend for new uploads is chosen once, at construction, and is
/// immutable for the process lifetime; every upload call site shares that one
/// decision. Resolve, delete and migrate route by the record's own storage
/// tag instead, so assets remain addressable regardless of which backend is
/// currently active.
///
/// No operation holds shared mutable state: uploads, deletes and migrations
/// may run concurrently, including for the same entity. In particular,
/// "first asset becomes the primary image" ordering is the caller's
/// responsibility; nothing here serializes concurrent primary designations.
pub struct AssetStorage {
    active: StorageKind,
    local: Option<Arc<dyn AssetBackend>>,
    remote: Option<Arc<dyn AssetBackend>>,
    validator: MediaValidator,
}

impl AssetStorage {
    pub fn new(
        active: StorageKind,
        local: Option<Arc<dyn AssetBackend>>,
        remote: Option<Arc<dyn AssetBackend>>,
        validator: MediaValidator,
    ) -> StorageResult<Self> {
        let storage = Self {
            active,
            local,
            remote,
            validator,
        };
        // The active backend must exist up front; the inactive one is only
        // required by the calls that actually reach it.
        storage.backend_for(active)?;
        Ok(storage)
    }

    /// The backend new uploads go to.
    pub fn active_backend(&self) -> StorageKind {
        self.active
    }

    fn backend_for(&self, kind: StorageKind) -> StorageResult<&Arc<dyn AssetBackend>> {
        let backend = match kind {
            StorageKind::Local => self.local.as_ref(),
            StorageKind::Remote => self.remote.as_ref(),
        };
        backend.ok_or_else(|| {
            StorageError::ConfigError(format!("{} storage backend not configured", kind))
        })
    }

    /// Upload a file on behalf of an entity.
    ///
    /// Validation runs first; a rejected file never reaches a backend. The
    /// returned record is only produced once the original bytes are durably
    /// stored — a failed backend call fails the whole upload once, with no
    /// retries and no partial record.
    pub async fn upload(
        &self,
        file: &UploadedFile,
        intent: &UploadIntent,
    ) -> StorageResult<AssetRecord> {
        self.validator
            .validate_all(&file.original_filename, &file.content_type, file.size())?;

        let slot = keys::upload_slot(intent);
        let backend = self.backend_for(self.active)?;
        let record = backend.store(file, &slot).await?;

        tracing::info!(
            entity_type = %intent.entity_type,
            entity_id = %intent.entity_id,
            storage = %record.storage,
            canonical_url = %record.canonical_url,
            "Asset upload complete"
        );

        Ok(record)
    }

    /// Resolve the asset's addressable URLs, optionally narrowed to one size.
    ///
    /// Pure per record: local records resolve by path concatenation, remote
    /// records by URL templating. No backend round-trip happens either way.
    pub fn resolve_urls(
        &self,
        record: &AssetRecord,
        size: Option<VariantName>,
    ) -> StorageResult<BTreeMap<String, String>> {
        let backend = self.backend_for(record.storage)?;
        let mut urls = backend.resolve_urls(record);

        if let Some(name) = size {
            urls.retain(|key, _| key == name.as_str() || key == "original");
        }

        Ok(urls)
    }

    /// Best-effort dual-resource delete.
    ///
    /// The logical record removal always proceeds: storage cleanup failures
    /// (network errors, partially deleted variants) are logged and reported
    /// as `storage_removed = false`, never raised. Leaving an orphaned blob
    /// is preferable to leaving a dangling reference in the primary store.
    pub async fn delete(&self, record: &AssetRecord) -> DeleteOutcome {
        let storage_removed = match self.backend_for(record.storage) {
            Ok(backend) => match backend.remove(record).await {
                Ok(removed) => removed,
                Err(err) => {
                    tracing::warn!(
                        storage = %record.storage,
                        canonical_url = %record.canonical_url,
                        error = %err,
                        "Storage cleanup failed, proceeding with record removal"
                    );
                    false
                }
            },
            Err(err) => {
                tracing::warn!(
                    storage = %record.storage,
                    error = %err,
                    "No backend available for cleanup, proceeding with record removal"
                );
                false
            }
        };

        DeleteOutcome {
            record_removed: true,
            storage_removed,
        }
    }

    /// Move a local asset to the remote backend.
    ///
    /// Returns a brand-new remote record; the local files are intentionally
    /// left in place and no persisted entity is updated — the caller swaps
    /// the records and separately deletes the local copy if desired. Not
    /// idempotent: migrating two copies of the same local record produces two
    /// independent remote assets, so callers must guard on the record's
    /// storage tag.
    pub async fn migrate(&self, record: &AssetRecord) -> StorageResult<AssetRecord> {
        if record.storage == StorageKind::Remote {
            return Err(StorageError::Conflict(
                "Asset is already stored remotely".to_string(),
            ));
        }

        let local = self.backend_for(StorageKind::Local)?;
        let remote = self.backend_for(StorageKind::Remote)?;

        let entity_type: EntityType = keys::entity_partition_of(&record.canonical_url)
            .ok_or_else(|| {
                StorageError::InvalidKey(format!(
                    "Cannot derive entity partition from key: {}",
                    record.canonical_url
                ))
            })?
            .parse()
            .map_err(|e| StorageError::InvalidKey(format!("{}", e)))?;

        let data = local.fetch(record).await?;

        let filename = record
            .canonical_url
            .rsplit('/')
            .next()
            .unwrap_or("asset.jpg")
            .to_string();
        let content_type = content_type_for_filename(&filename);
        let file = UploadedFile::new(data, content_type, filename);

        let slot = keys::migration_slot(entity_type);
        let migrated = remote.store(&file, &slot).await?;

        tracing::info!(
            from = %record.canonical_url,
            to = %migrated.canonical_url,
            backend_ref = ?migrated.backend_ref,
            "Asset migrated to remote storage"
        );

        Ok(migrated)
    }
}

fn content_type_for_filename(filename: &str) -> &'static str {
    match filename.rsplit('.').next().map(|e| e.to_lowercase()) {
        Some(ext) => match ext.as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "image/jpeg",
        },
        None => "image/jpeg",
    }
}
