use std::fmt::{Display, Formatter, Result as FmtResult};

use bytes::Bytes;

/// The kinds of business entities that own assets.
///
/// The entity type determines the destination namespace for both backends:
/// the local path partition and the remote identifier prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Product,
    Brand,
    Player,
    Post,
    Banner,
    ProductType,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Product => "product",
            EntityType::Brand => "brand",
            EntityType::Player => "player",
            EntityType::Post => "post",
            EntityType::Banner => "banner",
            EntityType::ProductType => "product_type",
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "product" => Ok(EntityType::Product),
            "brand" => Ok(EntityType::Brand),
            "player" => Ok(EntityType::Player),
            "post" => Ok(EntityType::Post),
            "banner" => Ok(EntityType::Banner),
            "product_type" => Ok(EntityType::ProductType),
            _ => Err(anyhow::anyhow!("Invalid entity type: {}", s)),
        }
    }
}

/// Caller-supplied description of where an upload belongs.
///
/// Immutable per call and never persisted; only the resulting
/// [`super::AssetRecord`] is stored.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UploadIntent {
    pub entity_type: EntityType,
    pub entity_id: String,
    /// Extra namespace component, e.g. a product color variant.
    #[serde(default)]
    pub discriminator: Option<String>,
    /// Destination folder on the remote service.
    pub folder_hint: String,
}

impl UploadIntent {
    pub fn new(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        let entity_id = entity_id.into();
        Self {
            entity_type,
            entity_id,
            discriminator: None,
            folder_hint: entity_type.as_str().to_string(),
        }
    }

    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn with_folder_hint(mut self, folder_hint: impl Into<String>) -> Self {
        self.folder_hint = folder_hint.into();
        self
    }
}

/// An uploaded file handle: bytes plus the declared MIME type and the
/// client-supplied original name. Produced by the HTTP layer, consumed here.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Bytes,
    pub content_type: String,
    pub original_filename: String,
}

impl UploadedFile {
    pub fn new(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        original_filename: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            original_filename: original_filename.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}
