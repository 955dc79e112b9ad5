//! Shared test utilities for the srcsetify test suite.
//!
//! Synthetic images are generated in memory with the `image` crate so no
//! fixture files are needed. Results built here use the real naming rules.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let bytes = jpeg_bytes(200, 150);
//! let result = sample_result("photo", &[320, 480, 1200]);
//! assert_eq!(result.variants[1].file_name, "photo-mob.webp");
//! ```

use crate::imaging::{OutputFormat, proportional_height};
use crate::markup::sizes_descriptor;
use crate::naming::{NamingInput, assign_file_names, width_bucket};
use crate::types::{ProcessingResult, SourceMetadata, Variant, VariantLabel};
use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};

// =========================================================================
// Synthetic images
// =========================================================================

/// A gradient JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A gradient PNG, optionally with a varying alpha channel.
pub fn png_bytes(width: u32, height: u32, alpha: bool) -> Vec<u8> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    if alpha {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, ((x * 7) % 256) as u8])
        });
        encoder
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
            .unwrap();
    } else {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, 64, (y % 256) as u8])
        });
        encoder
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
    }
    buf
}

// =========================================================================
// Results
// =========================================================================

/// A WebP result with one variant per width (ascending), 3:2 aspect, and
/// fake payloads. The natural width is the last width.
pub fn sample_result(name: &str, widths: &[u32]) -> ProcessingResult {
    let natural_w = widths.last().copied().unwrap_or(1);
    let natural = (natural_w, proportional_height((3, 2), natural_w));
    let format = OutputFormat::WebP;

    let suffixes: Vec<&str> = widths.iter().map(|&w| width_bucket(w as u64)).collect();
    let inputs: Vec<NamingInput<'_>> = widths
        .iter()
        .zip(&suffixes)
        .map(|(&width, suffix)| NamingInput {
            width,
            suffix,
            owns_suffix: false,
        })
        .collect();
    let file_names = assign_file_names(name, &inputs, format);

    let variants = widths
        .iter()
        .zip(suffixes)
        .zip(file_names)
        .map(|((&width, suffix), file_name)| {
            let height = proportional_height(natural, width);
            let bytes = format!("{name}@{width}").into_bytes();
            Variant {
                width,
                height,
                byte_len: bytes.len(),
                bytes,
                label: VariantLabel::RawDimensions(width, height),
                suffix: suffix.to_string(),
                file_name,
            }
        })
        .collect();

    ProcessingResult {
        original_name: name.to_string(),
        format,
        variants,
        sizes_attr: sizes_descriptor(natural.0),
        metadata: SourceMetadata {
            width: natural.0,
            height: natural.1,
            format: "jpeg".to_string(),
        },
        failed_widths: Vec::new(),
    }
}

/// 2026-10-17T09:30:00.123Z
pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-10-17T09:30:00.123Z")
        .unwrap()
        .with_timezone(&Utc)
}
