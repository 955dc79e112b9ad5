//! Configuration module.
//!
//! Handles loading, validating, and merging `srcsetify.toml`. Stock defaults
//! are the base layer; a user file overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # every key may be omitted; these are the defaults
//!
//! [images]
//! widths = [320, 480, 640, 768, 1024, 1366, 1536, 1920]  # Default ladder
//! format = "jpg"               # jpg, webp or png
//! unknown_format = "fallback"  # fallback (to jpg) or reject
//!
//! [markup]
//! base_dir = "images"          # Directory prefix in srcset candidates
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! A misspelled key is an error, not a silently ignored setting.

use crate::imaging::{FormatPolicy, OutputFormat};
use crate::markup::DEFAULT_BASE_DIR;
use crate::widths::DEFAULT_WIDTHS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "srcsetify.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `srcsetify.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Widths and output format.
    pub images: ImagesConfig,
    /// Responsive markup settings.
    pub markup: MarkupConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.widths.is_empty() {
            return Err(ConfigError::Validation(
                "images.widths must not be empty".into(),
            ));
        }
        if self.images.widths.contains(&0) {
            return Err(ConfigError::Validation(
                "images.widths values must be positive".into(),
            ));
        }
        if self.images.unknown_format == FormatPolicy::Reject
            && OutputFormat::from_token(&self.images.format).is_none()
        {
            return Err(ConfigError::Validation(format!(
                "images.format {:?} is not one of jpg, webp, png",
                self.images.format
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Width ladder and output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Widths rendered when no preset labels are requested.
    pub widths: Vec<u32>,
    /// Output format token.
    pub format: String,
    /// What to do with a format token that is not `jpg`, `webp` or `png`.
    pub unknown_format: FormatPolicy,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            widths: DEFAULT_WIDTHS.to_vec(),
            format: OutputFormat::default().extension().to_string(),
            unknown_format: FormatPolicy::default(),
        }
    }
}

/// Markup generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupConfig {
    /// Directory prefix for every srcset candidate.
    pub base_dir: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            base_dir: DEFAULT_BASE_DIR.to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Worker cap for the batch pool. `None` means one worker per core;
    /// anything above the core count is clamped.
    pub max_processes: Option<usize>,
}

/// Pool size for a batch: `max_processes` clamped to `1..=cores`, or all
/// cores when unset.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// `AppConfig::default()` as a TOML table, the layer a user file is merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Deep-merge two TOML values. Tables merge per key; any other overlay value
/// (arrays included) replaces the base value wholesale.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                let value = match base_table.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                base_table.insert(key, value);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse a config file without interpreting it. A missing file is `None`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(user) => merge_toml(base, user),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to defaults when it is
/// missing.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(path = %path.display(), ?config, "config loaded");
    Ok(config)
}

/// Documented `srcsetify.toml` printed by `gen-config`; parses to the defaults.
pub fn stock_config_toml() -> &'static str {
    r##"# srcsetify configuration
# =======================
# Every key below is optional and set to its default value.
# Delete what you don't want to change; misspelled keys are errors.

# --- Variants --------------------------------------------------------------
[images]
# Widths rendered when no preset labels are requested. Widths above a
# source's natural width are skipped; the natural width is always rendered.
widths = [320, 480, 640, 768, 1024, 1366, 1536, 1920]

# Output format for every variant: "jpg", "webp" or "png".
# jpg and webp are encoded at quality 85, png at maximum compression.
format = "jpg"

# What to do with an unrecognized format token:
#   "fallback" -> encode as jpg
#   "reject"   -> refuse the request
unknown_format = "fallback"

# --- Markup ----------------------------------------------------------------
[markup]
# Directory prefix for srcset candidates, e.g. "images/photo-mob.jpg 480w".
base_dir = "images"

# --- Processing ------------------------------------------------------------
[processing]
# Cap on parallel workers. Unset means one per CPU core.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(
            config.images.widths,
            vec![320, 480, 640, 768, 1024, 1366, 1536, 1920]
        );
        assert_eq!(config.images.format, "jpg");
        assert_eq!(config.images.unknown_format, FormatPolicy::Fallback);
        assert_eq!(config.markup.base_dir, "images");
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn parse_partial_config() {
        let config: AppConfig = toml::from_str(
            r#"
[images]
format = "webp"
"#,
        )
        .unwrap();
        assert_eq!(config.images.format, "webp");
        assert_eq!(config.images.widths, DEFAULT_WIDTHS.to_vec());
        assert_eq!(config.markup.base_dir, "images");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
[images]
quality = 90
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn merge_overrides_leaf_and_keeps_siblings() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[images]\nwidths = [100, 200]").unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.images.widths, vec![100, 200]);
        assert_eq!(config.images.format, "jpg");
    }

    #[test]
    fn merge_toml_replaces_non_tables() {
        let base: toml::Value = toml::from_str("a = 1\n[t]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("a = 5\n[t]\ny = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(5));
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.images.widths.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.images.widths.push(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.processing.max_processes = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn strict_policy_validates_format_token() {
        let mut config = AppConfig::default();
        config.images.format = "gif".into();
        assert!(config.validate().is_ok());

        config.images.unknown_format = FormatPolicy::Reject;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn effective_threads_clamps() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        assert_eq!(
            effective_threads(&ProcessingConfig {
                max_processes: Some(1)
            }),
            1
        );
        assert_eq!(
            effective_threads(&ProcessingConfig {
                max_processes: Some(cores + 100)
            }),
            cores
        );
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("srcsetify.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srcsetify.toml");
        fs::write(
            &path,
            r#"
[markup]
base_dir = "static/img"

[processing]
max_processes = 2
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.markup.base_dir, "static/img");
        assert_eq!(config.processing.max_processes, Some(2));
        assert_eq!(config.images.format, "jpg");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srcsetify.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
