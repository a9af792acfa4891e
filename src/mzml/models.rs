//! Data models for mzML structures
//!
//! These models represent the parsed mzML data in a Rust-native format,
//! ready to be handed to the spectrum ingestor.

use serde::{Deserialize, Serialize};

/// Represents a single spectrum from an mzML file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MzMLSpectrum {
    /// Spectrum index (0-based)
    pub index: i64,

    /// Native spectrum ID from the file
    pub id: String,

    /// Default array length (number of peaks)
    pub default_array_length: usize,

    /// MS level (1 for MS1, 2 for MS2, etc.)
    pub ms_level: Option<u8>,

    /// Retention time in minutes
    pub retention_time: Option<f64>,

    /// m/z array, `None` when the spectrum carries no m/z binaryDataArray
    pub mz_array: Option<Vec<f64>>,

    /// Intensity array, `None` when the spectrum carries no intensity binaryDataArray
    pub intensity_array: Option<Vec<f64>>,
}

impl MzMLSpectrum {
    /// Get the number of peaks
    pub fn peak_count(&self) -> usize {
        self.mz_array.as_ref().map_or(0, Vec::len)
    }
}

/// Run-level information captured while seeking the spectrum list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MzMLRunInfo {
    /// mzML schema version
    pub version: Option<String>,

    /// `id` attribute of the `<run>` element
    pub run_id: Option<String>,

    /// `count` attribute of `<spectrumList>`
    pub spectrum_count: Option<usize>,
}

/// One-pass summary of an mzML acquisition, reported by `mzroi info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MzMLSummary {
    /// Run-level information
    pub run: MzMLRunInfo,

    /// Number of spectra read
    pub spectra: usize,

    /// Spectrum counts keyed by MS level (0 = level not reported)
    pub spectra_per_ms_level: std::collections::BTreeMap<u8, usize>,

    /// Total number of (m/z, intensity) points
    pub total_points: usize,

    /// Lowest and highest retention time in minutes
    pub retention_time_range: Option<(f64, f64)>,

    /// Lowest and highest m/z value
    pub mz_range: Option<(f64, f64)>,
}

impl MzMLSummary {
    /// Fold one spectrum into the summary
    pub fn observe(&mut self, spectrum: &MzMLSpectrum) {
        self.spectra += 1;
        *self
            .spectra_per_ms_level
            .entry(spectrum.ms_level.unwrap_or(0))
            .or_insert(0) += 1;
        self.total_points += spectrum.peak_count();

        if let Some(rt) = spectrum.retention_time {
            self.retention_time_range = Some(widen(self.retention_time_range, rt, rt));
        }

        if let Some(mz) = spectrum.mz_array.as_deref() {
            let lo = mz.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = mz.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if lo.is_finite() && hi.is_finite() {
                self.mz_range = Some(widen(self.mz_range, lo, hi));
            }
        }
    }
}

fn widen(range: Option<(f64, f64)>, lo: f64, hi: f64) -> (f64, f64) {
    match range {
        Some((a, b)) => (a.min(lo), b.max(hi)),
        None => (lo, hi),
    }
}
