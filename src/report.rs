//! JSON report of a batch: what was produced, what failed, what is selected.
//!
//! Variant bytes are not embedded; each variant carries its size and SHA-256
//! so the report can be checked against files on disk or in an archive.

use crate::batch::Batch;
use crate::imaging::OutputFormat;
use crate::markup::build_markup;
use crate::types::{SourceMetadata, VariantLabel, WidthFailure};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub results: Vec<ResultReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorReport>,
    pub active_variants: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultReport {
    pub id: u64,
    pub original_name: String,
    pub format: OutputFormat,
    pub metadata: SourceMetadata,
    pub srcset: String,
    pub sizes: String,
    pub variants: Vec<VariantReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_widths: Vec<WidthFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub width: u32,
    pub height: u32,
    pub label: VariantLabel,
    pub file_name: String,
    pub byte_len: usize,
    pub sha256: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub source: String,
    pub message: String,
}

impl BatchReport {
    pub fn from_batch(batch: &Batch, base_dir: Option<&str>) -> Self {
        let selection = batch.selection();
        let results = batch
            .results()
            .into_iter()
            .map(|(id, result)| {
                let markup = build_markup(result, base_dir);
                ResultReport {
                    id,
                    original_name: result.original_name.clone(),
                    format: result.format,
                    metadata: result.metadata.clone(),
                    srcset: markup.srcset,
                    sizes: markup.sizes,
                    variants: result
                        .variants
                        .iter()
                        .enumerate()
                        .map(|(i, v)| VariantReport {
                            width: v.width,
                            height: v.height,
                            label: v.label.clone(),
                            file_name: v.file_name.clone(),
                            byte_len: v.byte_len,
                            sha256: v.sha256(),
                            active: selection.is_active(id, i),
                        })
                        .collect(),
                    failed_widths: result.failed_widths.clone(),
                }
            })
            .collect();

        let errors = batch
            .errors()
            .into_iter()
            .map(|e| ErrorReport {
                source: e.source_name().to_string(),
                message: e.to_string(),
            })
            .collect();

        Self {
            results,
            errors,
            active_variants: batch.active_count(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchContext, BatchRequest, SourceInput, process_batch_with};
    use crate::imaging::backend::tests::MockBackend;
    use crate::presets::PresetTable;

    fn batch() -> Batch {
        let request = BatchRequest {
            format: OutputFormat::Png,
            max_threads: 1,
            ..BatchRequest::default()
        };
        process_batch_with(
            &MockBackend::new(),
            &[
                SourceInput::new("cat.jpg", MockBackend::source_bytes(400, 200)),
                SourceInput::new("bad.jpg", b"??".to_vec()),
            ],
            &request,
            &PresetTable::standard(),
            &BatchContext::default(),
        )
    }

    #[test]
    fn report_lists_results_and_errors() {
        let mut batch = batch();
        let id = batch.id_at(0).unwrap();
        batch.toggle(id, 1);

        let report = BatchReport::from_batch(&batch, Some("assets"));
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].source, "bad.jpg");
        assert_eq!(report.active_variants, 1);

        let result = &report.results[0];
        assert_eq!(result.srcset, "assets/cat-mob-sm.png 320w, assets/cat-mob.png 400w");
        let active: Vec<bool> = result.variants.iter().map(|v| v.active).collect();
        assert_eq!(active, vec![true, false]);
        assert_eq!(result.variants[0].sha256.len(), 64);
    }

    #[test]
    fn json_has_no_raw_bytes() {
        let report = BatchReport::from_batch(&batch(), None);
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let variant = &value["results"][0]["variants"][0];
        assert!(variant.get("bytes").is_none());
        assert_eq!(variant["file_name"], "cat-mob-sm.png");
        assert_eq!(value["results"][0]["format"], "png");
    }
}
