use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use tokio::fs;

use shopmedia_core::{AssetRecord, StorageKind, UploadedFile, VariantName, VARIANT_SPECS};
use shopmedia_processing::imaging;

use crate::keys::{self, StorageSlot};
use crate::traits::{AssetBackend, StorageError, StorageResult};

/// Local filesystem backend
///
/// Stores the original and synchronously generated variants as files under a
/// deterministic, time-partitioned directory layout. Records carry relative
/// keys; URL resolution is pure base-url concatenation.
#[derive(Clone)]
pub struct LocalAssetBackend {
    root: PathBuf,
    base_url: String,
}

impl LocalAssetBackend {
    /// Create a new local backend rooted at `root`.
    ///
    /// # Arguments
    /// * `root` - directory the `uploads/` tree lives under
    /// * `base_url` - base URL assets are served from (e.g. "http://localhost:3000")
    pub async fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage root {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalAssetBackend {
            root,
            base_url: base_url.into(),
        })
    }

    /// Convert a relative key to a filesystem path, rejecting traversal
    /// sequences that could escape the storage root.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.root.join(key))
    }

    fn url_for(&self, key: &str) -> String {
        if self.base_url.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), key)
        }
    }

    /// Delete one file; missing files are a non-fatal "wasn't there".
    async fn remove_one(path: PathBuf) -> Result<bool, std::io::Error> {
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(ref e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(other) => Err(other),
        }
    }
}

#[async_trait]
impl AssetBackend for LocalAssetBackend {
    async fn store(&self, file: &UploadedFile, slot: &StorageSlot) -> StorageResult<AssetRecord> {
        let key = keys::local_object_key(slot.entity_type, &file.original_filename);
        let dir = self.key_to_path(&key.dir)?;
        let start = std::time::Instant::now();

        // Idempotent and recursive: concurrent uploads into the same month
        // partition race on this call without failing each other.
        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let original_key = key.original();
        let original_path = self.key_to_path(&original_key)?;
        fs::write(&original_path, &file.data).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                original_path.display(),
                e
            ))
        })?;

        let metadata = imaging::extract_metadata(&file.data);

        // Variants are best-effort: a failed render or write is logged and
        // its key omitted, the upload as a whole still succeeds.
        let mut variants: BTreeMap<VariantName, String> = BTreeMap::new();
        match imaging::decode_image(&file.data) {
            Ok((img, format)) => {
                for spec in &VARIANT_SPECS {
                    let rendered = match imaging::render_variant(&img, spec, format) {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            tracing::warn!(
                                variant = %spec.name,
                                key = %original_key,
                                error = %err,
                                "Variant generation failed, omitting"
                            );
                            continue;
                        }
                    };

                    let variant_key = key.variant(spec.name);
                    let variant_path = self.key_to_path(&variant_key)?;
                    match fs::write(&variant_path, &rendered).await {
                        Ok(()) => {
                            variants.insert(spec.name, variant_key);
                        }
                        Err(err) => {
                            tracing::warn!(
                                variant = %spec.name,
                                path = %variant_path.display(),
                                error = %err,
                                "Variant write failed, omitting"
                            );
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(
                    key = %original_key,
                    error = %err,
                    "Image decode failed, storing original without variants"
                );
            }
        }

        tracing::info!(
            key = %original_key,
            size_bytes = file.size(),
            variants = variants.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(AssetRecord::local(original_key, variants, metadata))
    }

    async fn fetch(&self, record: &AssetRecord) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(&record.canonical_url)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(record.canonical_url.clone()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(data)
    }

    async fn remove(&self, record: &AssetRecord) -> StorageResult<bool> {
        let original_path = self.key_to_path(&record.canonical_url)?;
        let variant_paths = record
            .variants
            .values()
            .map(|key| self.key_to_path(key))
            .collect::<StorageResult<Vec<_>>>()?;

        // Original and variants are independent keys: fan out the deletions
        // and wait for all of them. One failure never aborts the others.
        let original_fut = Self::remove_one(original_path);
        let variant_futs = join_all(variant_paths.into_iter().map(Self::remove_one));
        let (original_result, variant_results) = tokio::join!(original_fut, variant_futs);

        let mut fully_removed = true;

        let original_removed = match original_result {
            Ok(existed) => existed,
            Err(err) => {
                tracing::warn!(key = %record.canonical_url, error = %err, "Original delete failed");
                fully_removed = false;
                false
            }
        };

        for (key, result) in record.variants.values().zip(variant_results) {
            if let Err(err) = result {
                tracing::warn!(key = %key, error = %err, "Variant delete failed");
                fully_removed = false;
            }
        }

        tracing::info!(
            key = %record.canonical_url,
            removed = original_removed && fully_removed,
            "Local storage delete finished"
        );

        Ok(original_removed && fully_removed)
    }

    fn resolve_urls(&self, record: &AssetRecord) -> BTreeMap<String, String> {
        let original = self.url_for(&record.canonical_url);

        let mut urls = BTreeMap::new();
        for name in VariantName::ALL {
            let url = record
                .variants
                .get(&name)
                .map(|key| self.url_for(key))
                .unwrap_or_else(|| original.clone());
            urls.insert(name.to_string(), url);
        }
        urls.insert("original".to_string(), original);
        urls
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use shopmedia_core::EntityType;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([0, 128, 255, 255]),
        ));
        let mut buffer = Vec::new();
        img.to_rgb8()
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    fn brand_slot() -> StorageSlot {
        keys::upload_slot(&shopmedia_core::UploadIntent::new(EntityType::Brand, "B1"))
    }

    async fn backend(dir: &Path) -> LocalAssetBackend {
        LocalAssetBackend::new(dir, "http://localhost:3000")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn upload_writes_original_and_all_variants() {
        let dir = tempdir().unwrap();
        let storage = backend(dir.path()).await;

        let file = UploadedFile::new(jpeg_bytes(1200, 800), "image/jpeg", "logo.jpg");
        let record = storage.store(&file, &brand_slot()).await.unwrap();

        assert_eq!(record.storage, StorageKind::Local);
        assert!(record.backend_ref.is_none());
        assert!(record.canonical_url.starts_with("uploads/brand/"));
        assert_eq!(record.variants.len(), 3);
        assert_eq!(record.metadata.width, Some(1200));
        assert_eq!(record.metadata.height, Some(800));
        assert_eq!(record.metadata.format.as_deref(), Some("jpeg"));

        assert!(dir.path().join(&record.canonical_url).exists());
        for key in record.variants.values() {
            assert!(dir.path().join(key).exists());
        }
    }

    #[tokio::test]
    async fn same_entity_same_month_never_overwrites() {
        let dir = tempdir().unwrap();
        let storage = backend(dir.path()).await;

        let file = UploadedFile::new(jpeg_bytes(100, 100), "image/jpeg", "logo.jpg");
        let a = storage.store(&file, &brand_slot()).await.unwrap();
        let b = storage.store(&file, &brand_slot()).await.unwrap();

        assert_ne!(a.canonical_url, b.canonical_url);
        assert_eq!(
            Path::new(&a.canonical_url).parent(),
            Path::new(&b.canonical_url).parent()
        );
        assert!(dir.path().join(&a.canonical_url).exists());
        assert!(dir.path().join(&b.canonical_url).exists());
    }

    #[tokio::test]
    async fn undecodable_payload_still_stores_original() {
        let dir = tempdir().unwrap();
        let storage = backend(dir.path()).await;

        // Declared as JPEG but not decodable: the original is kept, variants
        // are omitted rather than written broken.
        let file = UploadedFile::new(b"not really a jpeg".to_vec(), "image/jpeg", "logo.jpg");
        let record = storage.store(&file, &brand_slot()).await.unwrap();

        assert!(record.variants.is_empty());
        assert!(record.metadata.width.is_none());
        assert_eq!(record.metadata.bytes, Some(17));
        assert!(dir.path().join(&record.canonical_url).exists());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = backend(dir.path()).await;

        let file = UploadedFile::new(jpeg_bytes(300, 300), "image/jpeg", "logo.jpg");
        let record = storage.store(&file, &brand_slot()).await.unwrap();

        assert!(storage.remove(&record).await.unwrap());
        assert!(!dir.path().join(&record.canonical_url).exists());
        for key in record.variants.values() {
            assert!(!dir.path().join(key).exists());
        }

        // Second delete: nothing left to remove, reported without error.
        assert!(!storage.remove(&record).await.unwrap());
    }

    #[tokio::test]
    async fn fetch_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = backend(dir.path()).await;

        let record = AssetRecord::local(
            "uploads/brand/2026/01/temp/gone_0_0.jpg",
            BTreeMap::new(),
            Default::default(),
        );
        assert!(matches!(
            storage.fetch(&record).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = backend(dir.path()).await;

        let record = AssetRecord::local(
            "../../../etc/passwd",
            BTreeMap::new(),
            Default::default(),
        );
        assert!(matches!(
            storage.fetch(&record).await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.remove(&record).await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn resolve_urls_is_pure_concatenation() {
        let dir = tempdir().unwrap();
        let storage = backend(dir.path()).await;

        let file = UploadedFile::new(jpeg_bytes(800, 800), "image/jpeg", "logo.jpg");
        let record = storage.store(&file, &brand_slot()).await.unwrap();

        let urls = storage.resolve_urls(&record);
        assert_eq!(urls.len(), 4);
        assert!(urls["original"].starts_with("http://localhost:3000/uploads/brand/"));
        assert!(urls["thumbnail"].ends_with("_thumbnail.jpg"));
        assert!(urls["medium"].ends_with("_medium.jpg"));
        assert!(urls["large"].ends_with("_large.jpg"));
    }

    #[tokio::test]
    async fn resolve_urls_falls_back_to_original_for_missing_variants() {
        let dir = tempdir().unwrap();
        let storage = backend(dir.path()).await;

        let record = AssetRecord::local(
            "uploads/brand/2026/01/temp/logo_0_0.jpg",
            BTreeMap::new(),
            Default::default(),
        );
        let urls = storage.resolve_urls(&record);
        assert_eq!(urls["thumbnail"], urls["original"]);
        assert_eq!(urls["large"], urls["original"]);
    }
}
