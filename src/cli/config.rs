//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can live in
//! a config file; flags given on the command line take precedence.
//!
//! ```toml
//! # mzroi.toml
//! [pipeline]
//! points_per_minute = 20
//! minute_start = 0
//! minute_end = 30
//! mz_min = 100.0
//! mz_max = 500.0
//! noise_floor = 1000.0
//! merge_mode = "positional"   # or "by-mz"
//! ms_level = 1
//!
//! [output]
//! format = "csv"              # csv, tsv or parquet
//! compression_level = 3
//! ```

use anyhow::{Context, Result};
use mzroi::ingest::MergeMode;
use mzroi::writer::OutputFormat;
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for mzroi.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Processing settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings for the processing stages.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Minimum rows per integer minute.
    pub points_per_minute: Option<i64>,

    /// First minute to resample (inclusive).
    pub minute_start: Option<i64>,

    /// Last minute to resample (exclusive).
    pub minute_end: Option<i64>,

    /// Lowest exported m/z bin.
    pub mz_min: Option<f64>,

    /// Highest exported m/z bin.
    pub mz_max: Option<f64>,

    /// Earliest exported retention time in minutes.
    pub rt_start: Option<f64>,

    /// Latest exported retention time in minutes.
    pub rt_end: Option<f64>,

    /// Intensities below this are zeroed.
    pub noise_floor: Option<f64>,

    /// How spectra sharing a retention time are combined.
    pub merge_mode: Option<MergeMode>,

    /// Keep only spectra of this MS level.
    pub ms_level: Option<u8>,
}

/// Settings for the written file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format; inferred from the extension when absent.
    pub format: Option<OutputFormat>,

    /// ZSTD level for Parquet output.
    pub compression_level: Option<i32>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
