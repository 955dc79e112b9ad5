//! # srcsetify
//!
//! Turns source images into a family of resized, re-encoded variants for
//! responsive web delivery, the `srcset` / `sizes` markup that references
//! them, and a zip export of any selected subset.
//!
//! # Pipeline
//!
//! ```text
//! bytes + file name
//!   │
//!   ├─ decode once                        imaging
//!   ├─ resolve target widths              widths, presets
//!   ├─ resize + encode every width        imaging (rayon, per width)
//!   ├─ name variants                      naming
//!   └─ ProcessingResult                   types
//!         │
//!         ├─ srcset / sizes / <img>       markup
//!         ├─ selection                    selection, batch
//!         ├─ zip export                   archive
//!         └─ JSON report                  report
//! ```
//!
//! Sources are processed in parallel on a bounded pool; a failure on one
//! source never affects its siblings, and results keep input order.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`presets`] | Immutable label → width table (`mobile` = 480, ...) |
//! | [`widths`] | Target width resolution: ladder or labels, capped, natural width kept |
//! | [`imaging`] | Decode / resize / encode behind the [`imaging::ImageBackend`] trait |
//! | [`naming`] | Filename suffixes (`mob-sm`, `tablet`, ...) and collision-free file names |
//! | [`markup`] | `srcset` candidates, `sizes` descriptor, full `<img>` tags via Maud |
//! | [`selection`] | Active variants per result, keyed by stable ids |
//! | [`batch`] | Parallel orchestration, progress events, cancellation |
//! | [`archive`] | Zip packaging with deterministic archive names |
//! | [`report`] | Serializable batch report with per-variant SHA-256 |
//! | [`config`] | `srcsetify.toml` loading, merging and validation |
//! | [`types`] | Shared result types |
//! | [`output`] | CLI output formatting |
//!
//! # Example
//!
//! ```no_run
//! use srcsetify::batch::{BatchContext, BatchRequest, SourceInput, process_batch};
//! use srcsetify::markup::build_markup;
//! use srcsetify::presets::PresetTable;
//!
//! let source = SourceInput::read("photo.jpg".as_ref()).unwrap();
//! let batch = process_batch(
//!     &[source],
//!     &BatchRequest::default(),
//!     &PresetTable::standard(),
//!     &BatchContext::default(),
//! );
//! for (_, result) in batch.results() {
//!     let markup = build_markup(result, Some("static/img"));
//!     println!("srcset=\"{}\" sizes=\"{}\"", markup.srcset, markup.sizes);
//! }
//! ```

pub mod archive;
pub mod batch;
pub mod config;
pub mod imaging;
pub mod markup;
pub mod naming;
pub mod output;
pub mod presets;
pub mod report;
pub mod selection;
pub mod types;
pub mod widths;

#[cfg(test)]
pub(crate) mod test_helpers;
