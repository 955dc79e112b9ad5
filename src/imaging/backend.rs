//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the two operations the pipeline needs:
//! decode a source buffer once, and render (resize + encode) one variant
//! from the decoded pixels.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! and `webp` crates.

use super::params::EncodeParams;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded source image.
///
/// Immutable once built. The batch keeps it alive only while the variants of
/// its own source are being rendered.
#[derive(Debug)]
pub struct SourceImage {
    pub(crate) pixels: DynamicImage,
    pub(crate) dimensions: Dimensions,
    pub(crate) format: String,
}

impl SourceImage {
    pub fn new(pixels: DynamicImage, format: impl Into<String>) -> Self {
        let dimensions = Dimensions {
            width: pixels.width(),
            height: pixels.height(),
        };
        Self {
            pixels,
            dimensions,
            format: format.into(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Detected source format name (`"jpeg"`, `"png"`, ...).
    pub fn format(&self) -> &str {
        &self.format
    }
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can serve every rayon worker.
pub trait ImageBackend: Sync {
    /// Decode raw bytes into a source image, detecting the format from content.
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, BackendError>;

    /// Resize `source` to the requested dimensions and encode it.
    fn render(&self, source: &SourceImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
