//! Spectrum ingestion: mzML spectra to a retention-time keyed mapping.
//!
//! Every spectrum is validated, denoised with a fixed intensity floor and
//! merged into [`TimeIndexedSpectra`] by its exact retention time.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::mzml::{MzMLError, MzMLSpectrum, MzMLStreamer};

/// Intensities strictly below this value are zeroed by default.
pub const DEFAULT_NOISE_FLOOR: f64 = 1000.0;

/// Errors raised while ingesting an acquisition file.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The acquisition file could not be read or is not valid mzML.
    #[error("failed to parse acquisition file: {0}")]
    Parse(#[from] MzMLError),

    /// A spectrum lacks a required field or its arrays disagree.
    #[error("malformed spectrum {id}: {reason}")]
    MalformedSpectrum {
        /// Native ID of the offending spectrum
        id: String,
        /// What is wrong with it
        reason: String,
    },
}

impl IngestError {
    fn malformed(id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSpectrum {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// How two spectra sharing a retention time are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Concatenate m/z sequences and sum intensity sequences position by
    /// position. Both intensity sequences must have the same length.
    #[default]
    Positional,
    /// Sum intensities of identical m/z values and append unseen m/z values.
    /// No length requirement.
    ByMz,
}

/// One validated acquisition event, retention time in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Native spectrum ID, kept for error reporting
    pub id: String,
    /// Retention time in minutes
    pub retention_time: f64,
    /// m/z values
    pub mz: Vec<f64>,
    /// Intensities, parallel to `mz`
    pub intensity: Vec<f64>,
}

impl TryFrom<MzMLSpectrum> for Spectrum {
    type Error = IngestError;

    fn try_from(raw: MzMLSpectrum) -> Result<Self, Self::Error> {
        let retention_time = raw
            .retention_time
            .ok_or_else(|| IngestError::malformed(&raw.id, "missing scan start time"))?;
        if !retention_time.is_finite() {
            return Err(IngestError::malformed(
                &raw.id,
                format!("retention time {retention_time} is not finite"),
            ));
        }
        let mz = raw
            .mz_array
            .ok_or_else(|| IngestError::malformed(&raw.id, "missing m/z array"))?;
        let intensity = raw
            .intensity_array
            .ok_or_else(|| IngestError::malformed(&raw.id, "missing intensity array"))?;
        if mz.len() != intensity.len() {
            return Err(IngestError::malformed(
                &raw.id,
                format!(
                    "m/z array length {} does not match intensity array length {}",
                    mz.len(),
                    intensity.len()
                ),
            ));
        }

        Ok(Self {
            id: raw.id,
            retention_time,
            mz,
            intensity,
        })
    }
}

/// Accumulated m/z and intensity sequences for one retention time.
///
/// After a positional merge `mz` is longer than `intensity`; consumers pair
/// points positionally up to the shorter of the two.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionEntry {
    /// Retention time in minutes
    pub retention_time: f64,
    /// m/z values
    pub mz: Vec<f64>,
    /// Intensities
    pub intensity: Vec<f64>,
}

impl RetentionEntry {
    /// Iterate (m/z, intensity) pairs
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.mz.iter().copied().zip(self.intensity.iter().copied())
    }
}

/// Mapping from exact retention time to accumulated spectra, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TimeIndexedSpectra {
    entries: Vec<RetentionEntry>,
    positions: HashMap<u64, usize>,
}

/// Hash key for exact floating-point equality; `-0.0` and `0.0` collapse.
fn rt_key(retention_time: f64) -> u64 {
    if retention_time == 0.0 {
        0.0f64.to_bits()
    } else {
        retention_time.to_bits()
    }
}

impl TimeIndexedSpectra {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct retention times
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no spectrum was stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> std::slice::Iter<'_, RetentionEntry> {
        self.entries.iter()
    }

    /// Look up the entry stored for an exact retention time
    pub fn get(&self, retention_time: f64) -> Option<&RetentionEntry> {
        self.positions
            .get(&rt_key(retention_time))
            .map(|&i| &self.entries[i])
    }

    /// Merge a spectrum into the mapping. Returns `true` if the retention
    /// time was already present.
    pub fn insert(&mut self, spectrum: Spectrum, mode: MergeMode) -> Result<bool, IngestError> {
        let key = rt_key(spectrum.retention_time);
        let Some(&position) = self.positions.get(&key) else {
            self.positions.insert(key, self.entries.len());
            self.entries.push(RetentionEntry {
                retention_time: spectrum.retention_time,
                mz: spectrum.mz,
                intensity: spectrum.intensity,
            });
            return Ok(false);
        };

        let entry = &mut self.entries[position];
        match mode {
            MergeMode::Positional => {
                if entry.intensity.len() != spectrum.intensity.len() {
                    return Err(IngestError::malformed(
                        &spectrum.id,
                        format!(
                            "cannot sum {} intensities position-wise into {} already stored at retention time {}",
                            spectrum.intensity.len(),
                            entry.intensity.len(),
                            entry.retention_time
                        ),
                    ));
                }
                for (acc, value) in entry.intensity.iter_mut().zip(&spectrum.intensity) {
                    *acc += value;
                }
                entry.mz.extend_from_slice(&spectrum.mz);
            }
            MergeMode::ByMz => {
                let mut by_mz: HashMap<u64, usize> = entry
                    .mz
                    .iter()
                    .enumerate()
                    .take(entry.intensity.len())
                    .map(|(i, mz)| (mz.to_bits(), i))
                    .collect();
                for (mz, value) in spectrum.mz.into_iter().zip(spectrum.intensity) {
                    match by_mz.get(&mz.to_bits()) {
                        Some(&i) => entry.intensity[i] += value,
                        None => {
                            // keep the paired prefix of `mz` aligned with `intensity`
                            let slot = entry.intensity.len();
                            entry.mz.insert(slot, mz);
                            entry.intensity.push(value);
                            by_mz.insert(mz.to_bits(), slot);
                        }
                    }
                }
            }
        }

        Ok(true)
    }
}

impl<'a> IntoIterator for &'a TimeIndexedSpectra {
    type Item = &'a RetentionEntry;
    type IntoIter = std::slice::Iter<'a, RetentionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Zero every intensity strictly below `floor`, leaving m/z values untouched.
pub fn apply_noise_floor(intensity: &mut [f64], floor: f64) {
    for value in intensity.iter_mut() {
        if *value < floor {
            *value = 0.0;
        }
    }
}

/// Ingestion settings
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Intensities strictly below this value are zeroed
    pub noise_floor: f64,
    /// How duplicate retention times are combined
    pub merge_mode: MergeMode,
    /// Only keep spectra of this MS level; `None` keeps every spectrum
    pub ms_level: Option<u8>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            noise_floor: DEFAULT_NOISE_FLOOR,
            merge_mode: MergeMode::default(),
            ms_level: None,
        }
    }
}

/// Counters collected during ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Spectra read from the source
    pub spectra_read: usize,
    /// Spectra dropped by the MS-level filter
    pub spectra_skipped: usize,
    /// Spectra merged into an already present retention time
    pub spectra_merged: usize,
    /// Points zeroed by the noise floor
    pub points_zeroed: usize,
}

/// Stage 1 of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct SpectrumIngestor {
    config: IngestConfig,
}

impl SpectrumIngestor {
    /// Create an ingestor with the given settings
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Read and merge every spectrum of an mzML file
    pub fn ingest_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(TimeIndexedSpectra, IngestStats), IngestError> {
        let path = path.as_ref();
        info!("Reading spectra from {}", path.display());
        let streamer = MzMLStreamer::open(path)?;
        self.ingest(streamer.spectra())
    }

    /// Merge spectra from any source; the first error aborts ingestion.
    pub fn ingest<I>(&self, spectra: I) -> Result<(TimeIndexedSpectra, IngestStats), IngestError>
    where
        I: IntoIterator<Item = Result<MzMLSpectrum, MzMLError>>,
    {
        let mut mapping = TimeIndexedSpectra::new();
        let mut stats = IngestStats::default();

        for raw in spectra {
            let raw = raw?;
            stats.spectra_read += 1;

            if let Some(level) = self.config.ms_level {
                if raw.ms_level != Some(level) {
                    stats.spectra_skipped += 1;
                    continue;
                }
            }

            let mut spectrum = Spectrum::try_from(raw)?;
            stats.points_zeroed += spectrum
                .intensity
                .iter()
                .filter(|&&v| v < self.config.noise_floor && v != 0.0)
                .count();
            apply_noise_floor(&mut spectrum.intensity, self.config.noise_floor);

            let rt = spectrum.retention_time;
            if mapping.insert(spectrum, self.config.merge_mode)? {
                debug!("Merged duplicate retention time {rt}");
                stats.spectra_merged += 1;
            }
        }

        info!(
            "Ingested {} spectra into {} retention times ({} merged, {} skipped)",
            stats.spectra_read,
            mapping.len(),
            stats.spectra_merged,
            stats.spectra_skipped
        );

        Ok((mapping, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, rt: f64, mz: &[f64], intensity: &[f64]) -> MzMLSpectrum {
        MzMLSpectrum {
            id: id.to_string(),
            ms_level: Some(1),
            retention_time: Some(rt),
            default_array_length: mz.len(),
            mz_array: Some(mz.to_vec()),
            intensity_array: Some(intensity.to_vec()),
            ..Default::default()
        }
    }

    fn ingest(config: IngestConfig, spectra: Vec<MzMLSpectrum>) -> Result<TimeIndexedSpectra, IngestError> {
        SpectrumIngestor::new(config)
            .ingest(spectra.into_iter().map(Ok))
            .map(|(mapping, _)| mapping)
    }

    #[test]
    fn test_noise_floor_zeroes_without_removing_points() {
        let mapping = ingest(
            IngestConfig::default(),
            vec![raw("a", 1.0, &[100.2, 100.6, 250.0], &[500.0, 1500.0, 999.999])],
        )
        .unwrap();

        let entry = mapping.get(1.0).unwrap();
        assert_eq!(entry.mz, vec![100.2, 100.6, 250.0]);
        assert_eq!(entry.intensity, vec![0.0, 1500.0, 0.0]);
    }

    #[test]
    fn test_noise_floor_is_strict() {
        let mut values = vec![1000.0, 999.0, 1000.5];
        apply_noise_floor(&mut values, DEFAULT_NOISE_FLOOR);
        assert_eq!(values, vec![1000.0, 0.0, 1000.5]);
    }

    #[test]
    fn test_custom_noise_floor() {
        let config = IngestConfig {
            noise_floor: 10.0,
            ..Default::default()
        };
        let mapping = ingest(config, vec![raw("a", 1.0, &[1.0, 2.0], &[9.0, 500.0])]).unwrap();
        assert_eq!(mapping.get(1.0).unwrap().intensity, vec![0.0, 500.0]);
    }

    #[test]
    fn test_positional_merge_concatenates_mz_and_sums_intensity() {
        let mapping = ingest(
            IngestConfig::default(),
            vec![
                raw("a", 2.5, &[100.0, 200.0], &[2000.0, 3000.0]),
                raw("b", 2.5, &[101.0, 201.0], &[4000.0, 500.0]),
            ],
        )
        .unwrap();

        assert_eq!(mapping.len(), 1);
        let entry = mapping.get(2.5).unwrap();
        assert_eq!(entry.mz, vec![100.0, 200.0, 101.0, 201.0]);
        // length stays per-spectrum; second point's 500 was floored first
        assert_eq!(entry.intensity, vec![6000.0, 3000.0]);
    }

    #[test]
    fn test_positional_merge_rejects_length_mismatch() {
        // The two-spectrum scenario at 1.0 min cannot be summed positionally.
        let err = ingest(
            IngestConfig::default(),
            vec![
                raw("first", 1.0, &[100.2, 100.6], &[500.0, 1500.0]),
                raw("second", 1.0, &[100.1], &[2000.0]),
            ],
        )
        .unwrap_err();

        match err {
            IngestError::MalformedSpectrum { id, .. } => assert_eq!(id, "second"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_by_mz_merge_reconciles_mismatched_lengths() {
        let config = IngestConfig {
            merge_mode: MergeMode::ByMz,
            ..Default::default()
        };
        let mapping = ingest(
            config,
            vec![
                raw("first", 1.0, &[100.2, 100.6], &[500.0, 1500.0]),
                raw("second", 1.0, &[100.1, 100.6], &[2000.0, 1000.0]),
            ],
        )
        .unwrap();

        let entry = mapping.get(1.0).unwrap();
        assert_eq!(entry.mz, vec![100.2, 100.6, 100.1]);
        assert_eq!(entry.intensity, vec![0.0, 2500.0, 2000.0]);
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let mapping = ingest(
            IngestConfig::default(),
            vec![
                raw("a", 3.0, &[1.0], &[1.0]),
                raw("b", 1.0, &[1.0], &[1.0]),
                raw("c", 3.0, &[2.0], &[1.0]),
                raw("d", 2.0, &[1.0], &[1.0]),
            ],
        )
        .unwrap();

        let order: Vec<f64> = mapping.iter().map(|e| e.retention_time).collect();
        assert_eq!(order, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_exact_equality_does_not_bucket_close_times() {
        let mapping = ingest(
            IngestConfig::default(),
            vec![raw("a", 1.0, &[1.0], &[1.0]), raw("b", 1.0 + 1e-12, &[1.0], &[1.0])],
        )
        .unwrap();
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let mut no_rt = raw("no-rt", 1.0, &[1.0], &[1.0]);
        no_rt.retention_time = None;
        let mut no_mz = raw("no-mz", 1.0, &[1.0], &[1.0]);
        no_mz.mz_array = None;
        let mut no_intensity = raw("no-int", 1.0, &[1.0], &[1.0]);
        no_intensity.intensity_array = None;
        let mismatched = raw("mismatch", 1.0, &[1.0, 2.0], &[1.0]);

        for spectrum in [no_rt, no_mz, no_intensity, mismatched] {
            let id = spectrum.id.clone();
            match ingest(IngestConfig::default(), vec![spectrum]) {
                Err(IngestError::MalformedSpectrum { id: got, .. }) => assert_eq!(got, id),
                other => panic!("expected malformed spectrum for {id}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_ms_level_filter_skips_other_levels() {
        let mut ms2 = raw("ms2", 1.5, &[1.0], &[5000.0]);
        ms2.ms_level = Some(2);
        // skipped spectra are not validated
        ms2.retention_time = None;

        let (mapping, stats) = SpectrumIngestor::new(IngestConfig {
            ms_level: Some(1),
            ..Default::default()
        })
        .ingest(vec![Ok(raw("ms1", 1.0, &[1.0], &[5000.0])), Ok(ms2)])
        .unwrap();

        assert_eq!(mapping.len(), 1);
        assert_eq!(stats.spectra_read, 2);
        assert_eq!(stats.spectra_skipped, 1);
    }

    #[test]
    fn test_reader_error_aborts_ingestion() {
        let spectra = vec![
            Ok(raw("a", 1.0, &[1.0], &[1.0])),
            Err(MzMLError::InvalidStructure("boom".to_string())),
        ];
        let err = SpectrumIngestor::default().ingest(spectra).unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
    }
}
