//! Generator configuration.
//!
//! Handles loading, validating, and merging `precompress.toml`. Stock
//! defaults are overridden by the user file, which in turn is overridden by
//! command-line flags (`--ext`, `--discovery`).
//!
//! ## Config File Location
//!
//! 1. `--config <file>` if given (the file must exist)
//! 2. `precompress.toml` in the asset root, if present
//! 3. stock defaults
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! extensions = ["html", "css", "js", "svg", "xml", "json"]
//! discovery = "find"        # "find" (external command) or "walk" (built in)
//!
//! [gzip]
//! program = "zopfli"        # invoked as: <program> --i127 <file>
//!
//! [brotli]
//! program = "brotli"        # invoked as: <program> --quality 15 --input <file> --output <file>.br
//! ```
//!
//! Unknown keys are rejected. Compressor flags are fixed; only the program
//! is configurable.

use crate::discovery::DiscoveryKind;
use crate::filter::{DEFAULT_EXTENSIONS, ExtensionSet, FilterError};
use crate::rules::Compressors;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File looked up in the asset root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "precompress.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

impl From<FilterError> for ConfigError {
    fn from(err: FilterError) -> Self {
        ConfigError::Validation(err.to_string())
    }
}

/// Generator configuration loaded from `precompress.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Extensions (no leading dot) of files to compress.
    pub extensions: Vec<String>,
    /// How files are enumerated.
    pub discovery: DiscoveryKind,
    /// gzip-compatible compressor.
    pub gzip: CompressorConfig,
    /// brotli compressor.
    pub brotli: CompressorConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let programs = Compressors::default();
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            discovery: DiscoveryKind::default(),
            gzip: CompressorConfig {
                program: programs.gzip,
            },
            brotli: CompressorConfig {
                program: programs.brotli,
            },
        }
    }
}

/// Program used for one artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressorConfig {
    pub program: String,
}

impl GeneratorConfig {
    /// Validate extensions and program names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ExtensionSet::new(&self.extensions)?;
        for (key, compressor) in [("gzip", &self.gzip), ("brotli", &self.brotli)] {
            if compressor.program.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{key}.program must not be empty"
                )));
            }
            if compressor.program.contains(['\n', '\r']) {
                return Err(ConfigError::Validation(format!(
                    "{key}.program must be a single line"
                )));
            }
        }
        Ok(())
    }

    /// The validated extension set.
    pub fn extension_set(&self) -> Result<ExtensionSet, ConfigError> {
        Ok(ExtensionSet::new(&self.extensions)?)
    }

    pub fn compressors(&self) -> Compressors {
        Compressors {
            gzip: self.gzip.program.clone(),
            brotli: self.brotli.program.clone(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GeneratorConfig::default())?)
}

/// Lay a config file over the stock defaults.
///
/// Top-level keys replace the stock value; the `[gzip]` and `[brotli]`
/// sections are overlaid field by field, so setting one program keeps the
/// other's default.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    let (mut merged, overlay) = match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => (base, overlay),
        (_, overlay) => return overlay,
    };
    for (key, value) in overlay {
        let value = match (merged.remove(&key), value) {
            (Some(toml::Value::Table(mut section)), toml::Value::Table(fields)) => {
                section.extend(fields);
                toml::Value::Table(section)
            }
            (_, value) => value,
        };
        merged.insert(key, value);
    }
    toml::Value::Table(merged)
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
) -> Result<GeneratorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GeneratorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config for an asset root.
///
/// An explicit path must exist; otherwise `precompress.toml` in `root` is
/// used when present.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<GeneratorConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let path = root.join(CONFIG_FILE_NAME);
            if path.is_file() {
                Some(load_raw_config(&path)?)
            } else {
                None
            }
        }
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `precompress.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# precompress-mk configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Looked up as precompress.toml in the asset root, or passed with --config.
# Unknown keys will cause an error.

# File extensions (no leading dot) to pre-compress. Matching is on the
# basename, case-sensitive, like `find -name '*.<ext>'`.
# --ext on the command line replaces this list.
extensions = ["html", "css", "js", "svg", "xml", "json"]

# How files are found:
#   "find" - run the external find(1) command
#   "walk" - walk the tree in process
discovery = "find"

# ---------------------------------------------------------------------------
# Compressors
# ---------------------------------------------------------------------------
# Only the program is configurable; flags are fixed.

[gzip]
# Invoked as: <program> --i127 <file>   (writes <file>.gz)
program = "zopfli"

[brotli]
# Invoked as: <program> --quality 15 --input <file> --output <file>.br
program = "brotli"
"##
}
