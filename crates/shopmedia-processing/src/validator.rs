use std::path::Path;

use shopmedia_core::AssetStorageConfig;

/// Validation errors for uploaded files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Uploaded-file validator
///
/// Runs before any backend call: a file rejected here never reaches storage.
/// Validation covers size, extension, declared content type, and the
/// extension/content-type cross-check.
pub struct MediaValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &AssetStorageConfig) -> Self {
        Self::new(
            config.max_file_size_bytes,
            config.allowed_extensions.clone(),
            config.allowed_content_types.clone(),
        )
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Validate declared content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type.to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate that the declared Content-Type matches the file extension.
    /// This prevents Content-Type spoofing where a non-image payload is
    /// uploaded under an image extension.
    pub fn validate_extension_content_type_match(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        let normalized_content_type = content_type.to_lowercase();

        let expected_content_types: Vec<&str> = match extension.as_str() {
            "jpg" | "jpeg" => vec!["image/jpeg"],
            "png" => vec!["image/png"],
            "gif" => vec!["image/gif"],
            "webp" => vec!["image/webp"],
            _ => {
                // Unknown extensions skip cross-validation; extension and
                // content type are still validated individually.
                tracing::debug!(
                    extension = %extension,
                    content_type = %content_type,
                    "Unknown extension, skipping Content-Type/extension cross-validation"
                );
                return Ok(());
            }
        };

        if !expected_content_types
            .iter()
            .any(|ct| ct == &normalized_content_type)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: format!(
                    "{} (does not match extension '{}'. Expected one of: {})",
                    content_type,
                    extension,
                    expected_content_types.join(", ")
                ),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate all aspects of an upload, including the cross-check.
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_file_size(file_size)?;
        self.validate_extension(filename)?;
        self.validate_content_type(content_type)?;
        self.validate_extension_content_type_match(filename, content_type)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> MediaValidator {
        MediaValidator::new(
            1024 * 1024, // 1MB
            vec!["jpg".to_string(), "png".to_string()],
            vec!["image/jpeg".to_string(), "image/png".to_string()],
        )
    }

    #[test]
    fn test_validate_file_size_ok() {
        let validator = test_validator();
        assert!(validator.validate_file_size(512 * 1024).is_ok());
    }

    #[test]
    fn test_validate_file_size_too_large() {
        let validator = test_validator();
        assert!(validator.validate_file_size(2 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_validate_file_size_empty() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_validate_extension_case_insensitive() {
        let validator = test_validator();
        assert!(validator.validate_extension("logo.jpg").is_ok());
        assert!(validator.validate_extension("logo.PNG").is_ok());
        assert!(validator.validate_extension("logo.gif").is_err());
        assert!(validator.validate_extension("noextension").is_err());
    }

    #[test]
    fn test_validate_content_type() {
        let validator = test_validator();
        assert!(validator.validate_content_type("image/jpeg").is_ok());
        assert!(validator.validate_content_type("IMAGE/PNG").is_ok());
        assert!(validator.validate_content_type("image/gif").is_err());
    }

    #[test]
    fn test_cross_validation_rejects_mismatch() {
        let validator = test_validator();
        assert!(validator
            .validate_extension_content_type_match("logo.jpg", "image/jpeg")
            .is_ok());
        assert!(validator
            .validate_extension_content_type_match("logo.jpg", "image/png")
            .is_err());
        // Unknown extensions skip the cross-check.
        assert!(validator
            .validate_extension_content_type_match("logo.xyz", "application/xyz")
            .is_ok());
    }

    #[test]
    fn test_validate_all() {
        let validator = test_validator();
        assert!(validator
            .validate_all("logo.jpg", "image/jpeg", 512 * 1024)
            .is_ok());
        assert!(validator
            .validate_all("logo.jpg", "image/jpeg", 2 * 1024 * 1024)
            .is_err());
        assert!(validator
            .validate_all("logo.gif", "image/gif", 512 * 1024)
            .is_err());
    }
}
