//! Configuration management
//!
//! A TOML file with one table per loaded resource. Every field has a default,
//! so an empty file (or none at all) is a valid configuration.

use std::path::{Path, PathBuf};

use mt_index_core::constants::{DEFAULT_MAX_GAP, DEFAULT_MAX_SPAN, DEFAULT_MIN_GAP, LOAD_MULTIPLIER};
use mt_index_core::GapConfig;
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language model settings
    pub lm: LmConfig,

    /// Phrase table settings
    pub phrase_table: PhraseTableConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Language model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// ARPA file to load
    pub path: Option<PathBuf>,

    /// Slots allocated per announced n-gram
    pub load_multiplier: f32,
}

/// Phrase table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseTableConfig {
    /// Table file to load
    pub path: Option<PathBuf>,

    /// Store source phrases bit-packed
    pub packed_keys: bool,

    /// Source phrases may contain gaps
    pub gapped: bool,

    /// Fewest tokens a gap spans
    pub min_gap: usize,

    /// Most tokens a gap spans
    pub max_gap: usize,

    /// Longest source span of a gapped match
    pub max_span: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self { path: None, load_multiplier: LOAD_MULTIPLIER }
    }
}

impl Default for PhraseTableConfig {
    fn default() -> Self {
        Self {
            path: None,
            packed_keys: false,
            gapped: false,
            min_gap: DEFAULT_MIN_GAP,
            max_gap: DEFAULT_MAX_GAP,
            max_span: DEFAULT_MAX_SPAN,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl PhraseTableConfig {
    /// Gap limits for a gapped table over the given gap symbol.
    pub fn gap_config(&self, gap: u32) -> GapConfig {
        GapConfig::new(gap)
            .with_gap_width(self.min_gap, self.max_gap)
            .with_max_span(self.max_span)
    }
}

impl Config {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if !(self.lm.load_multiplier >= 1.0) {
            return Err(Error::config(format!(
                "lm.load_multiplier must be at least 1.0, got {}",
                self.lm.load_multiplier
            )));
        }
        let table = &self.phrase_table;
        if table.min_gap == 0 || table.min_gap > table.max_gap {
            return Err(Error::config(format!(
                "phrase_table gap width {}..={} is empty",
                table.min_gap, table.max_gap
            )));
        }
        if table.gapped && table.packed_keys {
            return Err(Error::config("phrase_table.gapped and phrase_table.packed_keys are exclusive"));
        }
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(Error::config(format!("Invalid log level {:?}", other))),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read config file {}: {}", path.display(), e)))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| Error::config(format!("Failed to parse config file {}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `path`, or use defaults when no file is given.
///
/// A file that was named but cannot be read, parsed or validated is an error,
/// never a silent fallback.
pub fn load_config_or_default(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}
