//! Converter configuration module.
//!
//! Handles loading, validating, and merging a `config.toml` file. A user
//! file is sparse: it is layered over the stock defaults, so it only needs
//! the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! format = "jpeg"           # "jpeg" or "png"
//! quality = 0.9             # 0.0 - 1.0, used when saving JPEG files
//!
//! [network]
//! # timeout_secs = 30       # Omit for no timeout (requests may block forever)
//!
//! [local]
//! # content_root = "/data"  # Directory content:// URIs resolve under
//!
//! [decode]
//! max_alloc_mb = 512        # Decoder memory limit
//! ```
//!
//! Command-line flags override whatever the file says.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CompressFormat, DecodeOptions, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

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

/// Converter configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Default output encoding.
    pub output: OutputConfig,
    /// HTTP client settings.
    pub network: NetworkConfig,
    /// Local resource resolution.
    pub local: LocalConfig,
    /// Decoder limits.
    pub decode: DecodeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: CompressFormat,
    /// Fraction in `0.0..=1.0`.
    pub quality: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: CompressFormat::Jpeg,
            quality: 0.9,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    pub max_alloc_mb: u64,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self { max_alloc_mb: 512 }
    }
}

impl ConverterConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.output.quality.is_finite() || !(0.0..=1.0).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be between 0.0 and 1.0".into(),
            ));
        }
        if self.decode.max_alloc_mb == 0 {
            return Err(ConfigError::Validation(
                "decode.max_alloc_mb must be non-zero".into(),
            ));
        }
        if self.network.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "network.timeout_secs must be non-zero (omit it for no timeout)".into(),
            ));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::from_fraction(self.output.quality)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.network.timeout_secs.map(Duration::from_secs)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            bounds_only: false,
            max_alloc: Some(self.decode.max_alloc_mb.saturating_mul(1024 * 1024)),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ConverterConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ConverterConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ConverterConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path`, or the stock defaults when no path is given.
///
/// A path that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<ConverterConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Converter Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Encoding used when --format is not given: "jpeg" or "png".
format = "jpeg"

# JPEG quality as a fraction (0.0 = worst, 1.0 = best).
# Base64 output always uses the best quality.
quality = 0.9

# ---------------------------------------------------------------------------
# Network
# ---------------------------------------------------------------------------
[network]
# Seconds before an HTTP download is abandoned.
# Omit for no timeout: a stalled server blocks the conversion indefinitely.
# timeout_secs = 30

# ---------------------------------------------------------------------------
# Local resources
# ---------------------------------------------------------------------------
[local]
# Directory that content://authority/path URIs resolve under.
# Without it, content:// URIs load no image.
# content_root = "/var/lib/media"

# ---------------------------------------------------------------------------
# Decoding
# ---------------------------------------------------------------------------
[decode]
# Largest allocation the decoder may make, in MiB.
# Images needing more fail with an out-of-memory error.
max_alloc_mb = 512
"##
}
