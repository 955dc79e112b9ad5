//! Target width resolution.
//!
//! Turns a request (a list of preset labels, or nothing) plus the natural
//! width of a source image into the final ladder of widths to render.
//!
//! Rules, in order:
//!
//! 1. No labels (or none that are known) → the default width ladder.
//! 2. Labels map through the [`PresetTable`]; unknown labels are dropped
//!    silently. The first label to claim a width keeps it.
//! 3. Widths above the natural width are discarded. Images are never upscaled.
//! 4. The natural width is always present.
//!
//! The result is strictly ascending and duplicate-free.

use crate::presets::PresetTable;
use std::collections::BTreeMap;
use thiserror::Error;

/// Common responsive breakpoints used when no preset labels are requested.
pub const DEFAULT_WIDTHS: &[u32] = &[320, 480, 640, 768, 1024, 1366, 1536, 1920];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidthError {
    #[error("invalid source: natural width must be a positive integer")]
    InvalidSource,
}

/// One width to render, with the preset that claimed it (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetWidth {
    pub width: u32,
    pub preset: Option<&'static str>,
}

/// Strictly ascending, non-empty set of widths, capped by the natural width.
///
/// Only [`resolve_widths`] builds one, so the invariants always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetWidthSet(Vec<TargetWidth>);

impl TargetWidthSet {
    pub fn as_slice(&self) -> &[TargetWidth] {
        &self.0
    }

    pub fn widths(&self) -> Vec<u32> {
        self.0.iter().map(|t| t.width).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the natural width is the floor.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest width, which is the natural width.
    pub fn max(&self) -> u32 {
        self.0.last().map(|t| t.width).unwrap_or_default()
    }
}

/// Split the collaborator's comma-separated label list.
///
/// `"mobile, tablet,,"` → `["mobile", "tablet"]`
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve the widths to render for one source image.
pub fn resolve_widths<S: AsRef<str>>(
    presets: &PresetTable,
    ladder: &[u32],
    natural_width: u32,
    requested: &[S],
) -> Result<TargetWidthSet, WidthError> {
    if natural_width == 0 {
        return Err(WidthError::InvalidSource);
    }

    let mut candidates: Vec<TargetWidth> = requested
        .iter()
        .filter_map(|label| presets.get(label.as_ref()))
        .map(|p| TargetWidth {
            width: p.width,
            preset: Some(p.label),
        })
        .collect();

    if candidates.is_empty() {
        candidates = ladder
            .iter()
            .map(|&width| TargetWidth {
                width,
                preset: presets.for_width(width).map(|p| p.label),
            })
            .collect();
    }

    let mut by_width: BTreeMap<u32, Option<&'static str>> = BTreeMap::new();
    for candidate in candidates {
        if candidate.width == 0 || candidate.width > natural_width {
            continue;
        }
        by_width.entry(candidate.width).or_insert(candidate.preset);
    }
    by_width
        .entry(natural_width)
        .or_insert_with(|| presets.for_width(natural_width).map(|p| p.label));

    Ok(TargetWidthSet(
        by_width
            .into_iter()
            .map(|(width, preset)| TargetWidth { width, preset })
            .collect(),
    ))
}
