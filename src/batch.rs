//! Batch orchestration: many sources, one request.
//!
//! Every source is processed independently on a bounded rayon pool:
//!
//! ```text
//! source ──decode──▶ SourceImage ──resolve widths──▶ [w1 < w2 < … < natural]
//!                                   │ par_iter
//!                                   ▼
//!                        render(w) for every width
//!                                   │ collect (ascending order kept)
//!                                   ▼
//!                   name variants ──▶ ProcessingResult
//! ```
//!
//! A failure on one source becomes that item's [`ProcessError`] and never
//! touches its siblings. Within one source, a failed width is recorded in
//! [`ProcessingResult::failed_widths`] while the other widths still succeed;
//! only when every width fails does the whole source fail.
//!
//! ## Events
//!
//! When a sender is supplied, progress is reported as [`BatchEvent`]s. The
//! CLI drains them on a printer thread and formats them with
//! [`crate::output::format_batch_event`].
//!
//! ## Cancellation
//!
//! A [`CancelToken`] is checked before every decode and every encode. Work
//! already finished is kept; sources that had not completed become
//! [`ProcessError::Cancelled`].

use crate::archive::{self, Archive, ArchiveError, ExportScope};
use crate::config::{AppConfig, effective_threads};
use crate::imaging::{
    BackendError, ImageBackend, OutputFormat, RenderedVariant, RustBackend, UnknownFormat,
    decode_source, render_variant,
};
use crate::markup::sizes_descriptor;
use crate::naming::{self, NamingInput};
use crate::presets::PresetTable;
use crate::selection::{ResultId, SelectionState};
use crate::types::{ProcessingResult, SourceMetadata, Variant, WidthFailure};
use crate::widths::{parse_labels, resolve_widths};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Per-source failure, always carrying the source name so a caller can
/// retry just that item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("{name}: invalid source: {reason}")]
    InvalidSource { name: String, reason: String },
    #[error("{name}: decode failed: {message}")]
    Decode { name: String, message: String },
    #[error("{name}: encode failed at {width}px ({format}): {message}")]
    Encode {
        name: String,
        width: u32,
        format: OutputFormat,
        message: String,
    },
    #[error("{name}: cancelled")]
    Cancelled { name: String },
}

impl ProcessError {
    pub fn source_name(&self) -> &str {
        match self {
            Self::InvalidSource { name, .. }
            | Self::Decode { name, .. }
            | Self::Encode { name, .. }
            | Self::Cancelled { name } => name,
        }
    }
}

/// Raw bytes plus the file name they came from.
///
/// An input whose bytes could not be loaded still takes its place in the
/// batch and fails there as [`ProcessError::InvalidSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub name: String,
    pub bytes: Vec<u8>,
    pub load_error: Option<String>,
}

impl SourceInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            load_error: None,
        }
    }

    /// An input that could not be loaded, with the reason.
    pub fn unreadable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: Vec::new(),
            load_error: Some(reason.into()),
        }
    }

    /// Read a file; the name is the path's final component.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::new(display_name(path), bytes))
    }

    /// Like [`SourceInput::read`], but a failed read becomes an unreadable
    /// input instead of an error.
    pub fn load(path: &Path) -> Self {
        Self::read(path).unwrap_or_else(|e| {
            tracing::debug!(path = %path.display(), error = %e, "could not read source");
            Self::unreadable(display_name(path), e.to_string())
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Everything that applies to every source in one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub format: OutputFormat,
    /// Requested preset labels; empty means the default ladder.
    pub labels: Vec<String>,
    /// Default width ladder.
    pub widths: Vec<u32>,
    pub max_threads: usize,
}

impl BatchRequest {
    /// Build a request from config, with optional per-request overrides for
    /// the format token and the comma-separated label list.
    pub fn from_config(
        config: &AppConfig,
        format: Option<&str>,
        labels: Option<&str>,
    ) -> Result<Self, UnknownFormat> {
        let token = format.unwrap_or(&config.images.format);
        let resolved = OutputFormat::resolve(token, config.images.unknown_format)?;
        if OutputFormat::from_token(token).is_none() {
            tracing::warn!(token, fallback = %resolved, "unknown output format, falling back");
        }
        Ok(Self {
            format: resolved,
            labels: labels.map(parse_labels).unwrap_or_default(),
            widths: config.images.widths.clone(),
            max_threads: effective_threads(&config.processing),
        })
    }
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            labels: Vec::new(),
            widths: crate::widths::DEFAULT_WIDTHS.to_vec(),
            max_threads: effective_threads(&Default::default()),
        }
    }
}

/// Progress reported while a batch runs. `index` is the source's input
/// position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    SourceStarted {
        index: usize,
        name: String,
    },
    VariantEncoded {
        index: usize,
        width: u32,
        height: u32,
        byte_len: usize,
    },
    VariantFailed {
        index: usize,
        width: u32,
        format: OutputFormat,
        message: String,
    },
    SourceFinished {
        index: usize,
        name: String,
        variants: usize,
        failed: usize,
    },
    SourceFailed {
        index: usize,
        error: ProcessError,
    },
}

/// Shared flag that stops not-yet-started work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Optional event sink and cancellation for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchContext {
    pub events: Option<Sender<BatchEvent>>,
    pub cancel: CancelToken,
}

impl BatchContext {
    pub fn with_events(events: Sender<BatchEvent>) -> Self {
        Self {
            events: Some(events),
            cancel: CancelToken::new(),
        }
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            tx.send(event).ok();
        }
    }
}

/// One source's outcome, tagged with its stable id.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub id: ResultId,
    pub source_name: String,
    pub outcome: Result<ProcessingResult, ProcessError>,
}

/// Results, failures and the export selection of one batch.
///
/// Items stay in input order. Selection is keyed by [`ResultId`], so
/// removing an item leaves every other selection intact.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    items: Vec<BatchItem>,
    selection: SelectionState,
}

impl Batch {
    fn from_outcomes(
        names: Vec<String>,
        outcomes: Vec<Result<ProcessingResult, ProcessError>>,
    ) -> Self {
        let mut selection = SelectionState::new();
        let items = names
            .into_iter()
            .zip(outcomes)
            .enumerate()
            .map(|(i, (source_name, outcome))| {
                let id = i as ResultId;
                if let Ok(result) = &outcome {
                    selection.insert(id, result.variants.len());
                }
                BatchItem {
                    id,
                    source_name,
                    outcome,
                }
            })
            .collect();
        Self { items, selection }
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// Successful results in input order.
    pub fn results(&self) -> Vec<(ResultId, &ProcessingResult)> {
        self.items
            .iter()
            .filter_map(|item| item.outcome.as_ref().ok().map(|r| (item.id, r)))
            .collect()
    }

    pub fn errors(&self) -> Vec<&ProcessError> {
        self.items
            .iter()
            .filter_map(|item| item.outcome.as_ref().err())
            .collect()
    }

    pub fn get(&self, id: ResultId) -> Option<&ProcessingResult> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| item.outcome.as_ref().ok())
    }

    /// Id of the item at input position `index`.
    pub fn id_at(&self, index: usize) -> Option<ResultId> {
        self.items.get(index).map(|item| item.id)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn toggle(&mut self, id: ResultId, variant: usize) -> Option<bool> {
        self.selection.toggle(id, variant)
    }

    pub fn select_all(&mut self, id: ResultId) -> bool {
        self.selection.select_all(id)
    }

    pub fn deselect_all(&mut self, id: ResultId) -> bool {
        self.selection.deselect_all(id)
    }

    pub fn select_all_across(&mut self) {
        self.selection.select_all_across();
    }

    pub fn deselect_all_across(&mut self) {
        self.selection.deselect_all_across();
    }

    /// Keep only variants whose width is in `widths` active.
    pub fn select_widths(&mut self, widths: &[u32]) {
        for item in &self.items {
            if let Ok(result) = &item.outcome {
                for (i, variant) in result.variants.iter().enumerate() {
                    self.selection
                        .set(item.id, i, widths.contains(&variant.width));
                }
            }
        }
    }

    /// Active variants across every result.
    pub fn active_count(&self) -> usize {
        self.selection.total_active()
    }

    /// Drop one item (result or failure). Other ids and selections are
    /// unaffected.
    pub fn remove(&mut self, id: ResultId) -> Option<BatchItem> {
        let pos = self.items.iter().position(|item| item.id == id)?;
        self.selection.remove(id);
        Some(self.items.remove(pos))
    }

    /// Package the batch as a zip archive.
    pub fn export(
        &self,
        scope: ExportScope,
        timestamp: DateTime<Utc>,
    ) -> Result<Archive, ArchiveError> {
        let snapshot = self.selection.snapshot();
        archive::pack(&self.results(), &snapshot, scope, timestamp)
    }
}

/// Process sources with the production backend.
pub fn process_batch(
    sources: &[SourceInput],
    request: &BatchRequest,
    presets: &PresetTable,
    ctx: &BatchContext,
) -> Batch {
    process_batch_with(&RustBackend::new(), sources, request, presets, ctx)
}

/// Process sources with a specific backend (allows testing with mock).
pub fn process_batch_with(
    backend: &impl ImageBackend,
    sources: &[SourceInput],
    request: &BatchRequest,
    presets: &PresetTable,
    ctx: &BatchContext,
) -> Batch {
    let run = || -> Vec<Result<ProcessingResult, ProcessError>> {
        sources
            .par_iter()
            .enumerate()
            .map(|(index, source)| process_source(backend, index, source, request, presets, ctx))
            .collect()
    };

    let outcomes = match rayon::ThreadPoolBuilder::new()
        .num_threads(request.max_threads)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(e) => {
            tracing::warn!(error = %e, "could not build worker pool, using the global one");
            run()
        }
    };

    let names = sources.iter().map(|s| s.name.clone()).collect();
    Batch::from_outcomes(names, outcomes)
}

enum WidthOutcome {
    Rendered(RenderedVariant),
    Failed { width: u32, error: BackendError },
    Cancelled,
}

fn process_source(
    backend: &impl ImageBackend,
    index: usize,
    source: &SourceInput,
    request: &BatchRequest,
    presets: &PresetTable,
    ctx: &BatchContext,
) -> Result<ProcessingResult, ProcessError> {
    let outcome = render_source(backend, index, source, request, presets, ctx);
    match &outcome {
        Ok(result) => ctx.emit(BatchEvent::SourceFinished {
            index,
            name: source.name.clone(),
            variants: result.variants.len(),
            failed: result.failed_widths.len(),
        }),
        Err(error) => {
            tracing::debug!(source = %source.name, %error, "source failed");
            ctx.emit(BatchEvent::SourceFailed {
                index,
                error: error.clone(),
            })
        }
    }
    outcome
}

fn render_source(
    backend: &impl ImageBackend,
    index: usize,
    source: &SourceInput,
    request: &BatchRequest,
    presets: &PresetTable,
    ctx: &BatchContext,
) -> Result<ProcessingResult, ProcessError> {
    let name = source.name.clone();
    if ctx.cancel.is_cancelled() {
        return Err(ProcessError::Cancelled { name });
    }
    ctx.emit(BatchEvent::SourceStarted {
        index,
        name: name.clone(),
    });

    if let Some(reason) = &source.load_error {
        return Err(ProcessError::InvalidSource {
            name,
            reason: reason.clone(),
        });
    }
    if source.bytes.is_empty() {
        return Err(ProcessError::InvalidSource {
            name,
            reason: "empty input".to_string(),
        });
    }

    let image = decode_source(backend, &source.bytes).map_err(|e| ProcessError::Decode {
        name: name.clone(),
        message: backend_message(e),
    })?;
    let natural = image.dimensions();
    let source_format = image.format().to_string();

    let targets = resolve_widths(presets, &request.widths, natural.width, &request.labels)
        .map_err(|e| ProcessError::InvalidSource {
            name: name.clone(),
            reason: e.to_string(),
        })?;
    tracing::debug!(source = %name, widths = ?targets.widths(), "resolved widths");

    let outcomes: Vec<WidthOutcome> = targets
        .as_slice()
        .par_iter()
        .map(|target| {
            if ctx.cancel.is_cancelled() {
                return WidthOutcome::Cancelled;
            }
            match render_variant(backend, &image, target, request.format) {
                Ok(rendered) => WidthOutcome::Rendered(rendered),
                Err(error) => WidthOutcome::Failed {
                    width: target.width,
                    error,
                },
            }
        })
        .collect();
    drop(image);

    if outcomes.iter().any(|o| matches!(o, WidthOutcome::Cancelled)) {
        return Err(ProcessError::Cancelled { name });
    }

    let mut rendered = Vec::new();
    let mut failed_widths = Vec::new();
    for outcome in outcomes {
        match outcome {
            WidthOutcome::Rendered(variant) => {
                ctx.emit(BatchEvent::VariantEncoded {
                    index,
                    width: variant.width,
                    height: variant.height,
                    byte_len: variant.bytes.len(),
                });
                rendered.push(variant);
            }
            WidthOutcome::Failed { width, error } => {
                let message = backend_message(error);
                tracing::warn!(source = %name, width, %message, "variant failed");
                ctx.emit(BatchEvent::VariantFailed {
                    index,
                    width,
                    format: request.format,
                    message: message.clone(),
                });
                failed_widths.push(WidthFailure {
                    width,
                    format: request.format,
                    message,
                });
            }
            WidthOutcome::Cancelled => {}
        }
    }

    if rendered.is_empty() {
        let first = failed_widths.into_iter().next();
        return Err(match first {
            Some(first) => ProcessError::Encode {
                name,
                width: first.width,
                format: request.format,
                message: first.message,
            },
            None => ProcessError::InvalidSource {
                name,
                reason: "no widths to render".to_string(),
            },
        });
    }

    let original_name = naming::original_name(&name);
    let variants = name_variants(&original_name, rendered, request.format, presets);

    Ok(ProcessingResult {
        original_name,
        format: request.format,
        variants,
        sizes_attr: sizes_descriptor(natural.width),
        metadata: SourceMetadata {
            width: natural.width,
            height: natural.height,
            format: source_format,
        },
        failed_widths,
    })
}

/// Attach suffixes and collision-free file names.
fn name_variants(
    original_name: &str,
    rendered: Vec<RenderedVariant>,
    format: OutputFormat,
    presets: &PresetTable,
) -> Vec<Variant> {
    let suffixes: Vec<String> = rendered
        .iter()
        .map(|r| naming::suffix_for_label(presets, &r.label))
        .collect();
    let inputs: Vec<NamingInput<'_>> = rendered
        .iter()
        .zip(&suffixes)
        .map(|(r, suffix)| NamingInput {
            width: r.width,
            suffix,
            owns_suffix: naming::owns_suffix(presets, &r.label, suffix),
        })
        .collect();
    let file_names = naming::assign_file_names(original_name, &inputs, format);

    rendered
        .into_iter()
        .zip(suffixes)
        .zip(file_names)
        .map(|((r, suffix), file_name)| Variant {
            width: r.width,
            height: r.height,
            byte_len: r.bytes.len(),
            bytes: r.bytes,
            label: r.label,
            suffix,
            file_name,
        })
        .collect()
}

fn backend_message(error: BackendError) -> String {
    match error {
        BackendError::Decode(m) | BackendError::Encode(m) => m,
    }
}
