//! Variant naming: filename suffixes and file names.
//!
//! Every variant file is called `{original_name}-{suffix}.{ext}`. The suffix
//! comes from the variant's preset when the preset has one, otherwise from
//! the width bucket it falls into:
//!
//! ```text
//! width ≤ 360    mob-sm
//! width ≤ 480    mob
//! width ≤ 768    tablet
//! width ≤ 1366   desktop
//! otherwise      mob-lg
//! ```
//!
//! The `card` preset has no suffix of its own, so it is named by its width
//! (640 → `tablet`).
//!
//! ## Collisions
//!
//! Several variants of one image can map to the same suffix (a 640 `card`
//! and a 768 `tablet` are both `tablet`). [`assign_file_names`] keeps the
//! plain name for the variant whose preset owns the suffix and appends the
//! width to the others: `photo-tablet.webp`, `photo-tablet-640.webp`.

use crate::imaging::OutputFormat;
use crate::presets::PresetTable;
use crate::types::VariantLabel;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

static TRAILING_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:x\d+)?$").expect("valid trailing width pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Name used when a file name has no usable stem.
pub const FALLBACK_NAME: &str = "image";

/// Strip directories and the last extension from an uploaded file name.
///
/// - `"photo.jpg"` → `"photo"`
/// - `"archive.tar.gz"` → `"archive.tar"`
/// - `"uploads/cat.png"` → `"cat"`
pub fn original_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Size bucket suffix for a pixel width. Buckets cover every width with no
/// gaps and no overlaps.
pub fn width_bucket(width: u64) -> &'static str {
    match width {
        0..=360 => "mob-sm",
        361..=480 => "mob",
        481..=768 => "tablet",
        769..=1366 => "desktop",
        _ => "mob-lg",
    }
}

/// Replace whitespace runs with a single hyphen.
pub fn slugify(label: &str) -> String {
    WHITESPACE.replace_all(label, "-").into_owned()
}

/// Suffix for a free-form label string.
///
/// 1. Known preset with a suffix → that suffix.
/// 2. Known preset without one (`card`) → bucket of the preset's width.
/// 3. Trailing number, optionally `WIDTHxHEIGHT` → bucket of that width.
/// 4. Anything else → slugified label.
pub fn suffix_for(presets: &PresetTable, label: &str) -> String {
    if let Some(preset) = presets.get(label) {
        return match preset.suffix {
            Some(suffix) => suffix.to_string(),
            None => width_bucket(preset.width as u64).to_string(),
        };
    }
    if let Some(caps) = TRAILING_WIDTH.captures(label) {
        // Widths too long for u64 are still "large".
        let width = caps[1].parse::<u64>().unwrap_or(u64::MAX);
        return width_bucket(width).to_string();
    }
    slugify(label)
}

/// Suffix for a tagged variant label.
pub fn suffix_for_label(presets: &PresetTable, label: &VariantLabel) -> String {
    match label {
        VariantLabel::Preset(name) => suffix_for(presets, name),
        VariantLabel::RawDimensions(width, _) => width_bucket(*width as u64).to_string(),
    }
}

/// Whether `label` names a preset whose own suffix is `suffix`.
pub fn owns_suffix(presets: &PresetTable, label: &VariantLabel, suffix: &str) -> bool {
    match label {
        VariantLabel::Preset(name) => presets
            .get(name)
            .and_then(|p| p.suffix)
            .is_some_and(|s| s == suffix),
        VariantLabel::RawDimensions(..) => false,
    }
}

/// `{original_name}-{suffix}.{ext}`
pub fn variant_file_name(original_name: &str, suffix: &str, format: OutputFormat) -> String {
    format!("{}-{}.{}", original_name, suffix, format.extension())
}

/// A variant as seen by [`assign_file_names`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingInput<'a> {
    pub width: u32,
    pub suffix: &'a str,
    /// The variant's preset defines this suffix (rather than reaching it by bucket).
    pub owns_suffix: bool,
}

/// File names for every variant of one result, distinct from each other.
///
/// Inputs are in ascending width order; output is in the same order.
pub fn assign_file_names(
    original_name: &str,
    variants: &[NamingInput<'_>],
    format: OutputFormat,
) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in variants {
        *counts.entry(v.suffix).or_default() += 1;
    }

    // Who keeps the plain name for a shared suffix: the first owner, or the
    // first variant if nobody owns it.
    let mut plain_holder: HashMap<&str, usize> = HashMap::new();
    for (i, v) in variants.iter().enumerate() {
        if v.owns_suffix {
            plain_holder.entry(v.suffix).or_insert(i);
        }
    }
    for (i, v) in variants.iter().enumerate() {
        plain_holder.entry(v.suffix).or_insert(i);
    }

    let mut used = HashSet::new();
    variants
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let shared = counts.get(v.suffix).copied().unwrap_or(0) > 1;
            let mut name = if shared && plain_holder.get(v.suffix) != Some(&i) {
                variant_file_name(original_name, &format!("{}-{}", v.suffix, v.width), format)
            } else {
                variant_file_name(original_name, v.suffix, format)
            };
            // A slugified label can still land on a generated name.
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = variant_file_name(
                    original_name,
                    &format!("{}-{}-{}", v.suffix, v.width, n),
                    format,
                );
                n += 1;
            }
            name
        })
        .collect()
}
