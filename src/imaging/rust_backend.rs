//! Pure Rust image backend (plus libwebp for lossy WebP).
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder`, quality 85 |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, `CompressionType::Best` |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy), quality 85 |

use super::backend::{BackendError, ImageBackend, SourceImage};
use super::calculations::needs_resize;
use super::params::{EncodeParams, OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether a path looks like a decodable image, judged by extension.
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Source format name as reported in result metadata.
fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        other => other
            .extensions_str()
            .first()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

/// Production backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// 8-bit RGB or RGBA view of an image; other layouts are converted.
fn to_8bit(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(img),
        other if other.color().has_alpha() => {
            Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8()))
        }
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}

fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.value() as u8)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::Encode(format!("JPEG: {e}")))?;
    Ok(buf)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let img = to_8bit(img);
    let color = if img.color().has_alpha() {
        ExtendedColorType::Rgba8
    } else {
        ExtendedColorType::Rgb8
    };
    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive)
        .write_image(img.as_bytes(), img.width(), img.height(), color)
        .map_err(|e| BackendError::Encode(format!("PNG: {e}")))?;
    Ok(buf)
}

fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let img = to_8bit(img);
    let encoder = if img.color().has_alpha() {
        webp::Encoder::from_rgba(img.as_bytes(), img.width(), img.height())
    } else {
        webp::Encoder::from_rgb(img.as_bytes(), img.width(), img.height())
    };
    let memory = encoder
        .encode_simple(false, quality.value() as f32)
        .map_err(|e| BackendError::Encode(format!("WebP: {e:?}")))?;
    Ok(memory.to_vec())
}

fn encode(img: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
    match params.format {
        OutputFormat::Jpeg => encode_jpeg(img, params.quality),
        OutputFormat::WebP => encode_webp(img, params.quality),
        OutputFormat::Png => encode_png(img),
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, BackendError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| BackendError::Decode("unrecognized image format".to_string()))?;
        let pixels = reader
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(SourceImage::new(pixels, format_name(format)))
    }

    fn render(&self, source: &SourceImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let natural = (source.dimensions.width, source.dimensions.height);
        let target = (params.width, params.height);
        if target.0 > natural.0 || target.1 > natural.1 {
            return Err(BackendError::Encode(format!(
                "refusing to enlarge {}x{} to {}x{}",
                natural.0, natural.1, target.0, target.1
            )));
        }

        // resize_exact: the height is already computed from the aspect ratio,
        // and `resize` would re-derive it with its own rounding.
        let pixels = if needs_resize(natural, target) {
            Cow::Owned(
                source
                    .pixels
                    .resize_exact(params.width, params.height, FilterType::Lanczos3),
            )
        } else {
            Cow::Borrowed(&source.pixels)
        };
        encode(&pixels, params)
    }
}
