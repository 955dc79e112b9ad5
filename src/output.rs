//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every source is shown by its positional index and name first; variants,
//! markup and failures follow as indented context lines.
//!
//! # Output Format
//!
//! ## Progress
//!
//! ```text
//! 001 photo.jpg
//! 001    320x213 encoded (9.1 KB)
//! 001    480px (webp) failed: encode failed
//! 001    done: 5 variants, 1 failed
//! ```
//!
//! ## Results
//!
//! ```text
//! 001 photo (1200x800 jpeg → webp)
//!     [x] 320x213 photo-mob-sm.webp 9.1 KB
//!     [ ] 480x320 photo-mob.webp 14.0 KB
//!     srcset: images/photo-mob-sm.webp 320w, images/photo-mob.webp 480w
//!     sizes: (max-width: 1200px) 100vw, 1200px
//!
//! Errors
//! 002 broken.jpg: decode failed: unrecognized image format
//!
//! Processed 2 sources: 1 ok, 1 failed; 1 of 2 variants selected
//! ```
//!
//! # Architecture
//!
//! Each `format_*` function returns `Vec<String>` for testability and has a
//! `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::archive::Archive;
use crate::batch::{Batch, BatchEvent};
use crate::markup::build_markup;
use crate::selection::{ResultId, SelectionState};
use crate::types::ProcessingResult;
use crate::widths::TargetWidthSet;
use std::path::Path;

/// Format a 0-based position as a 1-based, 3-digit zero-padded index.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count: `512 B`, `9.1 KB`, `2.4 MB`.
pub fn format_file_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

// ============================================================================
// widths
// ============================================================================

/// Resolved ladder, one width per line with the preset that claimed it.
pub fn format_widths(natural_width: u32, set: &TargetWidthSet) -> Vec<String> {
    let mut lines = vec![format!("Natural width {}px → {} widths", natural_width, set.len())];
    for target in set.as_slice() {
        let label = match target.preset {
            Some(preset) => preset.to_string(),
            None if target.width == natural_width => "(natural)".to_string(),
            None => "-".to_string(),
        };
        lines.push(format!("{}{}w {}", indent(1), target.width, label));
    }
    lines
}

pub fn print_widths(natural_width: u32, set: &TargetWidthSet) {
    for line in format_widths(natural_width, set) {
        println!("{}", line);
    }
}

// ============================================================================
// Progress events
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::SourceStarted { index, name } => {
            vec![format!("{} {}", format_index(*index), name)]
        }
        BatchEvent::VariantEncoded {
            index,
            width,
            height,
            byte_len,
        } => vec![format!(
            "{}{}{}x{} encoded ({})",
            format_index(*index),
            indent(1),
            width,
            height,
            format_file_size(*byte_len)
        )],
        BatchEvent::VariantFailed {
            index,
            width,
            format,
            message,
        } => vec![format!(
            "{}{}{}px ({}) failed: {}",
            format_index(*index),
            indent(1),
            width,
            format,
            message
        )],
        BatchEvent::SourceFinished {
            index,
            variants,
            failed,
            ..
        } => {
            let detail = if *failed > 0 {
                format!("{} variants, {} failed", variants, failed)
            } else {
                format!("{} variants", variants)
            };
            vec![format!("{}{}done: {}", format_index(*index), indent(1), detail)]
        }
        BatchEvent::SourceFailed { index, error } => {
            vec![format!("{}{}error: {}", format_index(*index), indent(1), error)]
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// One result: header, variants with their selection mark, then markup.
pub fn format_result(
    position: usize,
    id: ResultId,
    result: &ProcessingResult,
    selection: &SelectionState,
    base_dir: Option<&str>,
) -> Vec<String> {
    let meta = &result.metadata;
    let mut lines = vec![format!(
        "{} {} ({}x{} {} → {})",
        format_index(position),
        result.original_name,
        meta.width,
        meta.height,
        meta.format,
        result.format
    )];
    for (i, v) in result.variants.iter().enumerate() {
        let mark = if selection.is_active(id, i) { "x" } else { " " };
        lines.push(format!(
            "{}[{}] {}x{} {} {}",
            indent(1),
            mark,
            v.width,
            v.height,
            v.file_name,
            format_file_size(v.byte_len)
        ));
    }
    for failure in &result.failed_widths {
        lines.push(format!(
            "{}[!] {}px ({}) failed: {}",
            indent(1),
            failure.width,
            failure.format,
            failure.message
        ));
    }
    let markup = build_markup(result, base_dir);
    lines.push(format!("{}srcset: {}", indent(1), markup.srcset));
    lines.push(format!("{}sizes: {}", indent(1), markup.sizes));
    lines
}

/// Every result and error of a batch, then a one-line summary.
pub fn format_batch(batch: &Batch, base_dir: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut errors = Vec::new();
    let mut ok = 0;

    for (position, item) in batch.items().iter().enumerate() {
        match &item.outcome {
            Ok(result) => {
                ok += 1;
                lines.extend(format_result(
                    position,
                    item.id,
                    result,
                    batch.selection(),
                    base_dir,
                ));
            }
            Err(error) => errors.push(format!("{} {}", format_index(position), error)),
        }
    }

    if !errors.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Errors".to_string());
        lines.extend(errors);
    }

    let total_variants: usize = batch
        .results()
        .iter()
        .map(|(_, r)| r.variants.len())
        .sum();
    lines.push(String::new());
    lines.push(format!(
        "Processed {} sources: {} ok, {} failed; {} of {} variants selected",
        batch.items().len(),
        ok,
        batch.items().len() - ok,
        batch.active_count(),
        total_variants
    ));
    lines
}

pub fn print_batch(batch: &Batch, base_dir: Option<&str>) {
    for line in format_batch(batch, base_dir) {
        println!("{}", line);
    }
}

/// Where an archive was written.
pub fn format_archive(archive: &Archive, path: &Path) -> Vec<String> {
    vec![format!(
        "Archive → {} ({} files, {})",
        path.display(),
        archive.entries.len(),
        format_file_size(archive.bytes.len())
    )]
}

pub fn print_archive(archive: &Archive, path: &Path) {
    for line in format_archive(archive, path) {
        println!("{}", line);
    }
}
