use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend kinds
///
/// This enum tags every [`crate::models::AssetRecord`] with the backend that
/// produced it. It's defined in core because it's used in configuration and
/// persisted on the caller's entity documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Remote,
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageKind::Local),
            "remote" => Ok(StorageKind::Remote),
            _ => Err(anyhow::anyhow!("Invalid storage kind: {}", s)),
        }
    }
}

impl Display for StorageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageKind::Local => write!(f, "local"),
            StorageKind::Remote => write!(f, "remote"),
        }
    }
}
