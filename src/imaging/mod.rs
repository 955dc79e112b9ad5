//! Image processing: decode, resize, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with format sniffing |
//! | **Resize** | `resize_exact` + Lanczos3 |
//! | **Encode → JPEG / PNG** | `image` codecs |
//! | **Encode → WebP** | `webp` (libwebp, lossy) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, SourceImage};
pub use calculations::{fit_inside, needs_resize, proportional_height};
pub use operations::{RenderedVariant, decode_source, plan_variant, render_variant};
pub use params::{EncodeParams, FormatPolicy, OutputFormat, Quality, UnknownFormat};
pub use rust_backend::{RustBackend, is_supported_input, supported_input_extensions};
