//! Shared result types produced by the batch and consumed by markup,
//! archive export and the JSON report.

use crate::imaging::OutputFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Where a variant's name comes from.
///
/// A variant either sits on a named preset width or is identified by its
/// raw dimensions (the natural width, or a ladder step no preset claims).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantLabel {
    Preset(String),
    RawDimensions(u32, u32),
}

impl fmt::Display for VariantLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(label) => f.write_str(label),
            Self::RawDimensions(w, h) => write!(f, "{w}x{h}"),
        }
    }
}

/// One resized, re-encoded rendition of a source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub byte_len: usize,
    pub label: VariantLabel,
    /// Short name used in file names (`mob`, `tablet`, ...).
    pub suffix: String,
    /// `{original_name}-{suffix}.{ext}`, unique within its result.
    pub file_name: String,
}

impl Variant {
    /// Hex SHA-256 of the encoded bytes.
    pub fn sha256(&self) -> String {
        format!("{:x}", Sha256::digest(&self.bytes))
    }
}

/// Snapshot of the source image's properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    /// Detected input format (`"jpeg"`, `"png"`, ...).
    pub format: String,
}

/// A width whose encode failed while its siblings succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidthFailure {
    pub width: u32,
    pub format: OutputFormat,
    pub message: String,
}

/// Everything produced for one source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    /// Source file name with its extension stripped.
    pub original_name: String,
    pub format: OutputFormat,
    /// Ascending by width.
    pub variants: Vec<Variant>,
    /// `sizes` attribute, derived once from the natural width.
    pub sizes_attr: String,
    pub metadata: SourceMetadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_widths: Vec<WidthFailure>,
}

impl ProcessingResult {
    pub fn widths(&self) -> Vec<u32> {
        self.variants.iter().map(|v| v.width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_display_matches_legacy_strings() {
        assert_eq!(VariantLabel::Preset("tablet".into()).to_string(), "tablet");
        assert_eq!(VariantLabel::RawDimensions(1200, 800).to_string(), "1200x800");
    }

    #[test]
    fn label_serializes_tagged() {
        let json = serde_json::to_string(&VariantLabel::RawDimensions(300, 200)).unwrap();
        assert_eq!(json, r#"{"raw_dimensions":[300,200]}"#);
        let json = serde_json::to_string(&VariantLabel::Preset("mobile".into())).unwrap();
        assert_eq!(json, r#"{"preset":"mobile"}"#);
    }

    #[test]
    fn variant_json_omits_bytes() {
        let variant = Variant {
            width: 10,
            height: 5,
            bytes: vec![1, 2, 3],
            byte_len: 3,
            label: VariantLabel::RawDimensions(10, 5),
            suffix: "mob-sm".into(),
            file_name: "x-mob-sm.jpg".into(),
        };
        let value = serde_json::to_value(&variant).unwrap();
        assert!(value.get("bytes").is_none());
        assert_eq!(value["byte_len"], 3);
        assert_eq!(
            variant.sha256(),
            "039058c6f2c0cb492c533b0a4d14ef77cc0f78abccced5287d84a1a2011cfb81"
        );
    }
}
