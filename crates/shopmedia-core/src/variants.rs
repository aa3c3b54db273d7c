//! Derived-size variant definitions.
//!
//! Every uploaded image gets the same fixed set of derived sizes, regardless
//! of which backend stores it. Both backends commit to this set, which is
//! what lets variant URLs be resolved without a backend round-trip.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The closed set of derived-size names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VariantName {
    Thumbnail,
    Medium,
    Large,
}

impl VariantName {
    /// All variant names, in ascending size order.
    pub const ALL: [VariantName; 3] = [
        VariantName::Thumbnail,
        VariantName::Medium,
        VariantName::Large,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantName::Thumbnail => "thumbnail",
            VariantName::Medium => "medium",
            VariantName::Large => "large",
        }
    }
}

impl Display for VariantName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "thumbnail" => Ok(VariantName::Thumbnail),
            "medium" => Ok(VariantName::Medium),
            "large" => Ok(VariantName::Large),
            _ => Err(anyhow::anyhow!("Invalid variant name: {}", s)),
        }
    }
}

/// A single derived-size definition: target bounding box and encoding quality.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct VariantSpec {
    pub name: VariantName,
    pub width: u32,
    pub height: u32,
    /// JPEG encoding quality (1-100); ignored for lossless formats.
    pub quality: u8,
}

/// The fixed derived-size profile applied to every uploaded image.
pub const VARIANT_SPECS: [VariantSpec; 3] = [
    VariantSpec {
        name: VariantName::Thumbnail,
        width: 150,
        height: 150,
        quality: 70,
    },
    VariantSpec {
        name: VariantName::Medium,
        width: 600,
        height: 600,
        quality: 80,
    },
    VariantSpec {
        name: VariantName::Large,
        width: 1200,
        height: 1200,
        quality: 85,
    },
];

impl VariantSpec {
    /// Look up the spec for a given name.
    pub fn for_name(name: VariantName) -> VariantSpec {
        VARIANT_SPECS[VariantName::ALL
            .iter()
            .position(|n| *n == name)
            .unwrap_or(0)]
    }
}
