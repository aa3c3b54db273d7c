//! The normalized asset record: the backend-agnostic result of an upload.

use std::collections::BTreeMap;

use crate::storage_kind::StorageKind;
use crate::variants::VariantName;

/// Best-effort technical metadata for a stored asset.
///
/// Absent fields are `None`, never fabricated. A decode failure during upload
/// still leaves `bytes` populated since the raw length is always known.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetMetadata {
    pub format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Option<u64>,
}

/// The normalized, backend-agnostic result of an upload.
///
/// Callers persist this record as-is on their own entity documents and hand
/// it back for later resolve/delete/migrate calls. All fields are interpreted
/// relative to the `storage` tag. Records are created once by upload and
/// never mutated: re-uploading produces a new record and the caller is
/// responsible for deleting the old one. After a successful delete the record
/// is terminal and must not be passed back in.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AssetRecord {
    /// Which backend produced this asset.
    pub storage: StorageKind,
    /// Primary address of the original: a relative key for local assets,
    /// a full delivery URL for remote ones. Always resolvable on its own.
    pub canonical_url: String,
    /// Backend-issued identifier. Present iff `storage == remote`; required
    /// for remote delete and never set on local records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_ref: Option<String>,
    /// Derived-size addresses. Keys are the fixed variant set; a key is
    /// absent only when that variant failed to generate.
    #[serde(default)]
    pub variants: BTreeMap<VariantName, String>,
    #[serde(default)]
    pub metadata: AssetMetadata,
}

impl AssetRecord {
    /// Build a local-backend record. Local records never carry a backend ref.
    pub fn local(
        canonical_key: impl Into<String>,
        variants: BTreeMap<VariantName, String>,
        metadata: AssetMetadata,
    ) -> Self {
        Self {
            storage: StorageKind::Local,
            canonical_url: canonical_key.into(),
            backend_ref: None,
            variants,
            metadata,
        }
    }

    /// Build a remote-backend record. The backend-issued reference is
    /// mandatory: it is the delete/migrate handle.
    pub fn remote(
        backend_ref: impl Into<String>,
        canonical_url: impl Into<String>,
        variants: BTreeMap<VariantName, String>,
        metadata: AssetMetadata,
    ) -> Self {
        Self {
            storage: StorageKind::Remote,
            canonical_url: canonical_url.into(),
            backend_ref: Some(backend_ref.into()),
            variants,
            metadata,
        }
    }
}

/// Outcome of a best-effort dual-resource delete.
///
/// Removing the owning business record and removing the stored bytes are
/// separate concerns: storage cleanup failing must not block the logical
/// delete, so both outcomes are reported instead of throwing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteOutcome {
    /// The owning record is safe to remove.
    pub record_removed: bool,
    /// All stored bytes (original + variants) were actually removed.
    pub storage_removed: bool,
}
