use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::StatusCode;

use shopmedia_core::{
    AssetMetadata, AssetRecord, StorageKind, UploadedFile, VariantName, VARIANT_SPECS,
};

use crate::keys::{self, StorageSlot};
use crate::traits::{AssetBackend, StorageError, StorageResult};

/// Remote hosted-media backend
///
/// One upload call stores the original and instructs the service to eagerly
/// materialize the fixed variant set. Variant generation is asynchronous on
/// the remote side: the call succeeds once the original is durable, and the
/// templated variant URLs may 404 briefly until processing finishes. That
/// window is accepted, not treated as an error.
#[derive(Clone)]
pub struct RemoteAssetBackend {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    delivery_base: String,
}

/// Upload response from the media service.
#[derive(Debug, serde::Deserialize)]
struct RemoteUploadResponse {
    public_id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    bytes: Option<u64>,
}

impl RemoteAssetBackend {
    pub fn new(
        api_base: impl Into<String>,
        delivery_base: impl Into<String>,
        api_key: Option<String>,
    ) -> StorageResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(RemoteAssetBackend {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
            delivery_base: delivery_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn asset_endpoint(&self, backend_ref: Option<&str>) -> String {
        match backend_ref {
            Some(r) => format!("{}/v1/assets/{}", self.api_base, r),
            None => format!("{}/v1/assets", self.api_base),
        }
    }

    /// Variant URLs are deterministic transformations of the backend ref, so
    /// they are computable without contacting the service.
    fn delivery_url(&self, segment: &str, backend_ref: &str) -> String {
        format!("{}/{}/{}", self.delivery_base, segment, backend_ref)
    }

    /// The eager-transformation instruction: every upload asks the service to
    /// materialize the same fixed variant set.
    fn eager_instruction() -> String {
        VARIANT_SPECS
            .iter()
            .map(|spec| format!("{}_{}x{}", spec.name, spec.width, spec.height))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn templated_variants(&self, backend_ref: &str) -> BTreeMap<VariantName, String> {
        VariantName::ALL
            .iter()
            .map(|name| (*name, self.delivery_url(name.as_str(), backend_ref)))
            .collect()
    }
}

#[async_trait]
impl AssetBackend for RemoteAssetBackend {
    async fn store(&self, file: &UploadedFile, slot: &StorageSlot) -> StorageResult<AssetRecord> {
        let backend_ref = keys::backend_ref(&slot.ref_seed);
        let start = std::time::Instant::now();

        let part = reqwest::multipart::Part::bytes(file.data.to_vec())
            .file_name(file.original_filename.clone())
            .mime_str(&file.content_type)
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .text("public_id", backend_ref.clone())
            .text("folder", slot.folder.clone())
            .text("eager", Self::eager_instruction())
            .part("file", part);

        let response = self
            .authorize(self.http.post(self.asset_endpoint(None)))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Media service upload: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::UploadFailed(format!(
                "Media service responded with status {}",
                status
            )));
        }

        let uploaded: RemoteUploadResponse = response.json().await.map_err(|e| {
            StorageError::UploadFailed(format!("Invalid media service response: {}", e))
        })?;

        let canonical_url = uploaded
            .url
            .unwrap_or_else(|| self.delivery_url("original", &uploaded.public_id));
        let variants = self.templated_variants(&uploaded.public_id);
        let metadata = AssetMetadata {
            format: uploaded.format,
            width: uploaded.width,
            height: uploaded.height,
            bytes: uploaded.bytes.or(Some(file.size() as u64)),
        };

        tracing::info!(
            backend_ref = %uploaded.public_id,
            folder = %slot.folder,
            size_bytes = file.size(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote storage upload successful"
        );

        Ok(AssetRecord::remote(
            uploaded.public_id,
            canonical_url,
            variants,
            metadata,
        ))
    }

    async fn fetch(&self, record: &AssetRecord) -> StorageResult<Vec<u8>> {
        let response = self
            .http
            .get(&record.canonical_url)
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("Media service fetch: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(record.canonical_url.clone())),
            status if status.is_success() => {
                let body = response.bytes().await.map_err(|e| {
                    StorageError::DownloadFailed(format!("Media service fetch body: {}", e))
                })?;
                Ok(body.to_vec())
            }
            status => Err(StorageError::DownloadFailed(format!(
                "Media service responded with status {}",
                status
            ))),
        }
    }

    async fn remove(&self, record: &AssetRecord) -> StorageResult<bool> {
        let backend_ref = record.backend_ref.as_deref().ok_or_else(|| {
            StorageError::InvalidKey("Remote record without backend reference".to_string())
        })?;

        let response = self
            .authorize(self.http.delete(self.asset_endpoint(Some(backend_ref))))
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("Media service delete: {}", e)))?;

        match response.status() {
            // Already gone is a non-fatal outcome: deletes are idempotent.
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                tracing::info!(backend_ref = %backend_ref, "Remote asset already removed");
                Ok(false)
            }
            status if status.is_success() => {
                tracing::info!(backend_ref = %backend_ref, "Remote storage delete successful");
                Ok(true)
            }
            status => Err(StorageError::DeleteFailed(format!(
                "Media service responded with status {}",
                status
            ))),
        }
    }

    fn resolve_urls(&self, record: &AssetRecord) -> BTreeMap<String, String> {
        let mut urls = BTreeMap::new();

        match record.backend_ref.as_deref() {
            Some(backend_ref) => {
                for name in VariantName::ALL {
                    urls.insert(
                        name.to_string(),
                        self.delivery_url(name.as_str(), backend_ref),
                    );
                }
                urls.insert(
                    "original".to_string(),
                    self.delivery_url("original", backend_ref),
                );
            }
            None => {
                // Defensive: a remote record always carries a ref, but the
                // canonical URL is still resolvable on its own.
                for name in VariantName::ALL {
                    urls.insert(name.to_string(), record.canonical_url.clone());
                }
                urls.insert("original".to_string(), record.canonical_url.clone());
            }
        }

        urls
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> RemoteAssetBackend {
        RemoteAssetBackend::new(
            "https://api.media.example.com/",
            "https://cdn.media.example.com/",
            Some("test-key".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn eager_instruction_lists_fixed_variant_set() {
        assert_eq!(
            RemoteAssetBackend::eager_instruction(),
            "thumbnail_150x150,medium_600x600,large_1200x1200"
        );
    }

    #[test]
    fn delivery_urls_are_templated_from_ref() {
        let storage = backend();
        assert_eq!(
            storage.delivery_url("thumbnail", "brand_B1_1700000000000"),
            "https://cdn.media.example.com/thumbnail/brand_B1_1700000000000"
        );
        assert_eq!(
            storage.asset_endpoint(Some("brand_B1_1700000000000")),
            "https://api.media.example.com/v1/assets/brand_B1_1700000000000"
        );
    }

    #[test]
    fn resolve_urls_never_contacts_the_service() {
        let storage = backend();
        let record = AssetRecord::remote(
            "player_P7_1700000000000",
            "https://cdn.media.example.com/original/player_P7_1700000000000",
            BTreeMap::new(),
            AssetMetadata::default(),
        );

        let urls = storage.resolve_urls(&record);
        assert_eq!(urls.len(), 4);
        assert_eq!(
            urls["medium"],
            "https://cdn.media.example.com/medium/player_P7_1700000000000"
        );
        assert_eq!(
            urls["original"],
            "https://cdn.media.example.com/original/player_P7_1700000000000"
        );
    }

    #[tokio::test]
    async fn remove_without_backend_ref_is_invalid() {
        let storage = backend();
        let mut record = AssetRecord::remote(
            "x",
            "https://cdn.media.example.com/original/x",
            BTreeMap::new(),
            AssetMetadata::default(),
        );
        record.backend_ref = None;

        assert!(matches!(
            storage.remove(&record).await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn remove_surfaces_transport_errors() {
        // Unroutable endpoint: the transport failure must come back as an
        // error for the orchestrator's best-effort policy to absorb.
        let storage = RemoteAssetBackend::new(
            "http://127.0.0.1:1",
            "https://cdn.media.example.com",
            None,
        )
        .unwrap();

        let record = AssetRecord::remote(
            "brand_B1_1",
            "https://cdn.media.example.com/original/brand_B1_1",
            BTreeMap::new(),
            AssetMetadata::default(),
        );

        assert!(matches!(
            storage.remove(&record).await,
            Err(StorageError::DeleteFailed(_))
        ));
    }
}
