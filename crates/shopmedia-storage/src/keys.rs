//! Shared key and identifier generation for storage backends.
//!
//! All naming lives here so the two backends stay consistent: local keys are
//! time-partitioned under `uploads/{entity_type}/{year}/{month}/temp/`, and
//! remote identifiers are namespaced per entity type. Uniqueness comes from a
//! wall-clock millisecond timestamp plus a random component, so concurrent
//! uploads to the same entity never need coordination.

use std::path::Path;

use chrono::Utc;

use shopmedia_core::constants::LOCAL_UPLOADS_PREFIX;
use shopmedia_core::{EntityType, UploadIntent, VariantName};

/// Where an upload goes: the destination namespace computed once by the
/// orchestrator and handed to whichever backend is active.
#[derive(Debug, Clone)]
pub struct StorageSlot {
    /// Entity partition for local keys.
    pub entity_type: EntityType,
    /// Destination folder on the remote service.
    pub folder: String,
    /// Seed for the remote identifier; the backend appends a timestamp.
    pub ref_seed: String,
}

/// Build the slot for a caller upload.
///
/// The remote identifier seed is namespaced per entity type:
/// `brand_{id}`, `player_{id}`, `product_{id}_{discriminator}`.
pub fn upload_slot(intent: &UploadIntent) -> StorageSlot {
    let mut ref_seed = format!("{}_{}", intent.entity_type, intent.entity_id);
    if let Some(discriminator) = &intent.discriminator {
        ref_seed.push('_');
        ref_seed.push_str(discriminator);
    }

    StorageSlot {
        entity_type: intent.entity_type,
        folder: intent.folder_hint.clone(),
        ref_seed: sanitize_component(&ref_seed),
    }
}

/// Build the slot for a local-to-remote migration.
///
/// Migrated assets get a `migrated_{timestamp}` identifier seed instead of an
/// entity-derived one; the destination folder is re-derived from the local
/// key's entity partition.
pub fn migration_slot(entity_type: EntityType) -> StorageSlot {
    StorageSlot {
        entity_type,
        folder: entity_type.as_str().to_string(),
        ref_seed: format!("migrated_{}", Utc::now().timestamp_millis()),
    }
}

/// A fully named local object: directory partition, unique file stem and
/// extension. Variant files are siblings of the original.
#[derive(Debug, Clone)]
pub struct LocalObjectKey {
    pub dir: String,
    pub file_stem: String,
    pub extension: String,
}

impl LocalObjectKey {
    pub fn original(&self) -> String {
        format!("{}/{}.{}", self.dir, self.file_stem, self.extension)
    }

    pub fn variant(&self, name: VariantName) -> String {
        format!(
            "{}/{}_{}.{}",
            self.dir, self.file_stem, name, self.extension
        )
    }
}

/// Generate a local object key for an upload.
///
/// Layout: `uploads/{entity_type}/{year}/{month}/temp/{stem}_{millis}_{rand}.{ext}`.
/// The `{millis}_{rand}` suffix keeps concurrent uploads for the same entity
/// in the same month partition from colliding.
pub fn local_object_key(entity_type: EntityType, original_filename: &str) -> LocalObjectKey {
    let now = Utc::now();
    let dir = format!(
        "{}/{}/{}/{:02}/temp",
        LOCAL_UPLOADS_PREFIX,
        entity_type,
        now.format("%Y"),
        now.format("%m"),
    );

    let stem = Path::new(original_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(sanitize_component)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "asset".to_string());

    let extension = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());

    let file_stem = format!(
        "{}_{}_{:04x}",
        stem,
        now.timestamp_millis(),
        rand::random::<u16>()
    );

    LocalObjectKey {
        dir,
        file_stem,
        extension,
    }
}

/// Mint a remote backend reference from a slot seed.
pub fn backend_ref(ref_seed: &str) -> String {
    format!("{}_{}", ref_seed, Utc::now().timestamp_millis())
}

/// The entity partition of a local key: the path segment right after the
/// uploads prefix. Migration uses this to re-derive the destination folder.
pub fn entity_partition_of(key: &str) -> Option<&str> {
    let mut segments = key.split('/');
    if segments.next() != Some(LOCAL_UPLOADS_PREFIX) {
        return None;
    }
    segments.next().filter(|s| !s.is_empty())
}

/// Keep identifier components URL- and filesystem-safe.
fn sanitize_component(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    out.truncate(80);
    out
}
