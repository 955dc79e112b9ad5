//! Parameter types for image operations.
//!
//! These structs describe *what* to encode, not *how*. They sit between the
//! high-level [`operations`](super::operations) module and the
//! [`backend`](super::backend) doing the pixel work, which is what lets the
//! tests swap in a recording mock.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`OutputFormat`]: The three supported output formats and their tokens.
//! - [`FormatPolicy`]: What to do with an unrecognized format token.
//! - [`EncodeParams`]: Target dimensions, format and quality for one variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Output format of every variant in a result.
///
/// The tokens are `jpg`, `webp` and `png`, matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "jpg")]
    Jpeg,
    #[serde(rename = "webp")]
    WebP,
    #[serde(rename = "png")]
    Png,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported output format {0:?} (expected jpg, webp or png)")]
pub struct UnknownFormat(pub String);

/// Handling of output format tokens that are not `jpg`, `webp` or `png`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatPolicy {
    /// Coerce to [`OutputFormat::Jpeg`].
    #[default]
    Fallback,
    /// Refuse the request.
    Reject,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Jpeg, OutputFormat::WebP, OutputFormat::Png];

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "jpg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Parse a request token, applying `policy` to unknown values.
    pub fn resolve(token: &str, policy: FormatPolicy) -> Result<Self, UnknownFormat> {
        match (Self::from_token(token), policy) {
            (Some(format), _) => Ok(format),
            (None, FormatPolicy::Fallback) => Ok(Self::default()),
            (None, FormatPolicy::Reject) => Err(UnknownFormat(token.to_string())),
        }
    }

    /// Filename extension, identical to the request token.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parameters for encoding one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    /// Ignored by lossless formats, which always use maximum compression effort.
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_85() {
        assert_eq!(Quality::default().value(), 85);
    }

    #[test]
    fn tokens_are_case_sensitive() {
        assert_eq!(OutputFormat::from_token("webp"), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_token("WEBP"), None);
        assert_eq!(OutputFormat::from_token("jpeg"), None);
    }

    #[test]
    fn unknown_token_falls_back_to_jpeg() {
        assert_eq!(
            OutputFormat::resolve("gif", FormatPolicy::Fallback),
            Ok(OutputFormat::Jpeg)
        );
    }

    #[test]
    fn unknown_token_rejected_under_strict_policy() {
        assert_eq!(
            OutputFormat::resolve("gif", FormatPolicy::Reject),
            Err(UnknownFormat("gif".to_string()))
        );
        assert_eq!(
            OutputFormat::resolve("png", FormatPolicy::Reject),
            Ok(OutputFormat::Png)
        );
    }

    #[test]
    fn extension_round_trips_through_token() {
        for format in OutputFormat::ALL {
            assert_eq!(OutputFormat::from_token(format.extension()), Some(format));
        }
    }

    #[test]
    fn serde_uses_tokens() {
        assert_eq!(
            serde_json::to_string(&OutputFormat::WebP).unwrap(),
            "\"webp\""
        );
        let policy: FormatPolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, FormatPolicy::Reject);
    }
}
