//! Zip export of processed variants.
//!
//! ## Layout
//!
//! ```text
//! photo-selected-2026-10-17T09-30-00-123Z.zip
//! └── photo/
//!     ├── photo-mob-sm.webp
//!     ├── photo-mob.webp
//!     └── photo-tablet.webp
//! ```
//!
//! One folder per result that contributes at least one file, named after the
//! result's `original_name`.
//!
//! ## Results with the same name
//!
//! A zip cannot hold two entries with the same path, so two distinct
//! `photo` folders are not possible. Results that share an `original_name`
//! share one `photo/` directory entry instead, and when two files would land
//! on the same path the later one gets a counter before its extension. Two
//! sources `photo.jpg` and `photo.png`, both 320px wide, export as:
//!
//! ```text
//! srcsetify-batch-….zip
//! └── photo/
//!     ├── photo-mob-sm.webp      first source
//!     └── photo-mob-sm-2.webp    second source
//! ```
//!
//! Nothing is dropped and the export does not fail.
//!
//! Entries are stored uncompressed: the payloads are already-compressed
//! image formats.

use crate::selection::{ResultId, SelectionState};
use crate::types::ProcessingResult;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Prefix for archives that span several results.
pub const MULTI_RESULT_PREFIX: &str = "srcsetify";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("nothing selected for export")]
    EmptySelection,
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which variants an export includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// Every variant of every result, regardless of selection.
    Batch,
    /// Only active variants.
    Selected,
}

impl ExportScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::Selected => "selected",
        }
    }
}

/// Finished archive, ready to hand off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Paths of the files written, in archive order.
    pub entries: Vec<String>,
}

/// One file to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry<'a> {
    pub result_id: ResultId,
    pub folder: &'a str,
    pub path: String,
    pub bytes: &'a [u8],
}

/// Decide every path before writing anything.
pub fn plan_entries<'a>(
    results: &[(ResultId, &'a ProcessingResult)],
    selection: &SelectionState,
    scope: ExportScope,
) -> Vec<ArchiveEntry<'a>> {
    let mut used = HashSet::new();
    let mut entries = Vec::new();

    for &(id, result) in results {
        for (index, variant) in result.variants.iter().enumerate() {
            let included = match scope {
                ExportScope::Batch => true,
                ExportScope::Selected => selection.is_active(id, index),
            };
            if !included {
                continue;
            }

            let folder = result.original_name.as_str();
            let mut path = format!("{}/{}", folder, variant.file_name);
            let mut n = 2;
            while !used.insert(path.clone()) {
                path = format!("{}/{}", folder, with_counter(&variant.file_name, n));
                n += 1;
            }
            entries.push(ArchiveEntry {
                result_id: id,
                folder,
                path,
                bytes: &variant.bytes,
            });
        }
    }
    entries
}

/// `photo-mob.webp` + 2 → `photo-mob-2.webp`
fn with_counter(file_name: &str, n: usize) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{n}.{ext}"),
        None => format!("{file_name}-{n}"),
    }
}

/// Sortable UTC stamp safe for file names: `2026-10-17T09-30-00-123Z`.
pub fn timestamp_stamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Archive file name. `single` is the only contributing result's name, if
/// exactly one result contributes.
pub fn archive_name(single: Option<&str>, scope: ExportScope, timestamp: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}.zip",
        single.unwrap_or(MULTI_RESULT_PREFIX),
        scope.as_str(),
        timestamp_stamp(timestamp)
    )
}

/// Build the zip archive.
///
/// `selection` should be a snapshot; it is only read.
pub fn pack(
    results: &[(ResultId, &ProcessingResult)],
    selection: &SelectionState,
    scope: ExportScope,
    timestamp: DateTime<Utc>,
) -> Result<Archive, ArchiveError> {
    let entries = plan_entries(results, selection, scope);
    if entries.is_empty() {
        return Err(ArchiveError::EmptySelection);
    }

    let contributing: Vec<ResultId> = {
        let mut ids: Vec<ResultId> = entries.iter().map(|e| e.result_id).collect();
        ids.dedup();
        ids
    };
    let single = match contributing.as_slice() {
        [only] => results
            .iter()
            .find(|(id, _)| id == only)
            .map(|(_, r)| r.original_name.as_str()),
        _ => None,
    };

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut folders = HashSet::new();
    for entry in &entries {
        if folders.insert(entry.folder) {
            writer.add_directory(format!("{}/", entry.folder), options)?;
        }
        writer.start_file(entry.path.as_str(), options)?;
        writer.write_all(entry.bytes)?;
    }
    let bytes = writer.finish()?.into_inner();

    let file_name = archive_name(single, scope, timestamp);
    tracing::debug!(%file_name, files = entries.len(), bytes = bytes.len(), "archive packed");

    Ok(Archive {
        file_name,
        entries: entries.into_iter().map(|e| e.path).collect(),
        bytes,
    })
}
