//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take a target width, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend, SourceImage};
use super::calculations::fit_inside;
use super::params::{EncodeParams, OutputFormat, Quality};
use crate::types::VariantLabel;
use crate::widths::TargetWidth;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// One encoded width, before it is named and attached to a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedVariant {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
    pub label: VariantLabel,
}

/// Decode a source buffer, rejecting images without pixels.
pub fn decode_source(backend: &impl ImageBackend, bytes: &[u8]) -> Result<SourceImage> {
    let source = backend.decode(bytes)?;
    let Dimensions { width, height } = source.dimensions();
    if width == 0 || height == 0 {
        return Err(BackendError::Decode(format!(
            "image has no pixels ({width}x{height})"
        )));
    }
    Ok(source)
}

/// Plan one variant without executing it.
pub fn plan_variant(natural: Dimensions, target: &TargetWidth, format: OutputFormat) -> EncodeParams {
    let (width, height) = fit_inside((natural.width, natural.height), target.width);
    EncodeParams {
        width,
        height,
        format,
        quality: Quality::default(),
    }
}

/// Label for a rendered width: its preset, or its raw dimensions.
pub fn variant_label(target: &TargetWidth, width: u32, height: u32) -> VariantLabel {
    match target.preset {
        Some(label) => VariantLabel::Preset(label.to_string()),
        None => VariantLabel::RawDimensions(width, height),
    }
}

/// Resize and encode `source` at one target width.
pub fn render_variant(
    backend: &impl ImageBackend,
    source: &SourceImage,
    target: &TargetWidth,
    format: OutputFormat,
) -> Result<RenderedVariant> {
    let params = plan_variant(source.dimensions(), target, format);
    let bytes = backend.render(source, &params)?;
    Ok(RenderedVariant {
        width: params.width,
        height: params.height,
        bytes,
        label: variant_label(target, params.width, params.height),
    })
}
