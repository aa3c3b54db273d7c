//! Shared constants.

/// Root prefix for all locally stored assets. This prefix is load-bearing:
/// already-stored assets live under `uploads/<entity>/<year>/<month>/`, so it
/// must not change without a data migration.
pub const LOCAL_UPLOADS_PREFIX: &str = "uploads";

/// Default upload size ceiling (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Image extensions accepted by default.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Image content types accepted by default.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "image/gif"];
