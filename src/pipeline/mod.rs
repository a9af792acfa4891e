//! # Pipeline
//!
//! Runs the four stages in strict order:
//!
//! ```text
//! mzML ──▶ SpectrumIngestor ──▶ MatrixBuilder ──▶ Resampler ──▶ ExportRegion ──▶ RegionWriter
//!          TimeIndexedSpectra   DenseIntensityTable (padded)     (bounded)        file
//! ```
//!
//! Each stage fully consumes the previous one's output. The first error
//! aborts the run and is returned as a [`PipelineError`]; observers see a
//! single terminal [`PipelineEvent::Failed`] or [`PipelineEvent::Completed`].
//!
//! ```rust,no_run
//! use mzroi::pipeline::{NoopObserver, Pipeline, PipelineParams};
//!
//! let params = PipelineParams::new("run.mzML", "eroi.csv", 20, 0, 30).with_mz_range(100.0, 500.0);
//! let report = Pipeline::new(params)?.run(&mut NoopObserver)?;
//! println!("{} rows written", report.writer.rows_written);
//! # Ok::<(), mzroi::pipeline::PipelineError>(())
//! ```

mod error;
mod events;
mod runner;


use std::path::PathBuf;
use std::time::Instant;

use log::{error, info};
use serde::Serialize;

use crate::ingest::{IngestConfig, IngestStats, SpectrumIngestor, TimeIndexedSpectra};
use crate::matrix::{DenseIntensityTable, MatrixBuilder};
use crate::region::{ExportRegion, RegionBounds};
use crate::resample::{ResampleStats, Resampler};
use crate::writer::{RegionWriter, WriterConfig, WriterStats};

pub use error::PipelineError;
pub use events::{ChannelObserver, NoopObserver, PipelineEvent, PipelineObserver, Stage};
pub use runner::PipelineHandle;

/// Parameters of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Acquisition file to read
    pub source_path: PathBuf,
    /// Destination of the exported region
    pub output_path: PathBuf,
    /// Minimum rows per integer minute after resampling
    pub target_points_per_minute: i64,
    /// First minute bucket to resample (inclusive)
    pub minute_start: i64,
    /// Last minute bucket to resample (exclusive)
    pub minute_end: i64,
    /// Lowest m/z bin exported
    pub mz_min: f64,
    /// Highest m/z bin exported
    pub mz_max: f64,
    /// Exported retention-time window; `None` exports `[minute_start, minute_end]`
    pub rt_range: Option<(f64, f64)>,
    /// Ingestion settings
    pub ingest: IngestConfig,
    /// Output settings
    pub writer: WriterConfig,
}

impl PipelineParams {
    /// Parameters with the default m/z range `[0, +inf)` and ingestion settings
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        target_points_per_minute: i64,
        minute_start: i64,
        minute_end: i64,
    ) -> Self {
        let defaults = RegionBounds::default();
        Self {
            source_path: source_path.into(),
            output_path: output_path.into(),
            target_points_per_minute,
            minute_start,
            minute_end,
            mz_min: defaults.mz_min,
            mz_max: defaults.mz_max,
            rt_range: None,
            ingest: IngestConfig::default(),
            writer: WriterConfig::default(),
        }
    }

    /// Restrict exported columns to bins in `[mz_min, mz_max]`
    pub fn with_mz_range(mut self, mz_min: f64, mz_max: f64) -> Self {
        self.mz_min = mz_min;
        self.mz_max = mz_max;
        self
    }

    /// Export rows with retention time in `[start, end]` instead of the minute range
    pub fn with_rt_range(mut self, start: f64, end: f64) -> Self {
        self.rt_range = Some((start, end));
        self
    }

    /// Replace the ingestion settings
    pub fn with_ingest(mut self, ingest: IngestConfig) -> Self {
        self.ingest = ingest;
        self
    }

    /// Replace the output settings
    pub fn with_writer(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }

    /// Export bounds implied by these parameters
    pub fn region_bounds(&self) -> Result<RegionBounds, PipelineError> {
        let (rt_start, rt_end) = self
            .rt_range
            .unwrap_or((self.minute_start as f64, self.minute_end as f64));
        Ok(RegionBounds::new(self.mz_min, self.mz_max, rt_start, rt_end)?)
    }

    /// Check every domain constraint without touching the filesystem
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.source_path.as_os_str().is_empty() {
            return Err(PipelineError::InvalidParameter(
                "source path is empty".to_string(),
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(PipelineError::InvalidParameter(
                "output path is empty".to_string(),
            ));
        }
        if self.ingest.noise_floor.is_nan() {
            return Err(PipelineError::InvalidParameter(
                "noise floor must be a number".to_string(),
            ));
        }
        RegionWriter::new(self.writer.clone())
            .resolve_format(&self.output_path)
            .map_err(|err| PipelineError::InvalidParameter(err.to_string()))?;
        self.resampler()?;
        self.region_bounds()?;
        Ok(())
    }

    fn resampler(&self) -> Result<Resampler, PipelineError> {
        Ok(Resampler::new(
            self.target_points_per_minute,
            self.minute_start,
            self.minute_end,
        )?)
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Acquisition file read
    pub source_path: PathBuf,
    /// File written
    pub output_path: PathBuf,
    /// Ingestion counters
    pub ingest: IngestStats,
    /// Distinct retention times after merging
    pub retention_times: usize,
    /// Distinct m/z bins in the full table
    pub mz_bins: usize,
    /// Resampling counters
    pub resample: ResampleStats,
    /// Bounds of the export
    pub bounds: RegionBounds,
    /// Output counters
    pub writer: WriterStats,
    /// Wall-clock duration of the run in seconds
    pub elapsed_secs: f64,
}

/// A validated, runnable pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    params: PipelineParams,
}

impl Pipeline {
    /// Validate `params` and build a pipeline
    pub fn new(params: PipelineParams) -> Result<Self, PipelineError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters of this pipeline
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Run every stage on the calling thread, reporting to `observer`
    pub fn run(&self, observer: &mut dyn PipelineObserver) -> Result<PipelineReport, PipelineError> {
        observer.on_event(&PipelineEvent::Started);
        match self.execute(observer) {
            Ok(report) => {
                info!(
                    "Pipeline finished in {:.2}s: {} rows x {} bins written to {}",
                    report.elapsed_secs,
                    report.writer.rows_written,
                    report.writer.columns_written,
                    report.output_path.display()
                );
                observer.on_event(&PipelineEvent::Completed(report.clone()));
                Ok(report)
            }
            Err(err) => {
                error!("Pipeline failed: {err}");
                observer.on_event(&PipelineEvent::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    fn execute(&self, observer: &mut dyn PipelineObserver) -> Result<PipelineReport, PipelineError> {
        let started = Instant::now();
        let params = &self.params;
        let resampler = params.resampler()?;
        let bounds = params.region_bounds()?;

        observer.on_event(&PipelineEvent::StageStarted(Stage::Ingest));
        let (spectra, ingest) =
            SpectrumIngestor::new(params.ingest.clone()).ingest_file(&params.source_path)?;

        let (region, resample, retention_times, mz_bins) =
            process_in_memory(&spectra, &resampler, bounds, observer);

        observer.on_event(&PipelineEvent::StageStarted(Stage::Write));
        let writer = RegionWriter::new(params.writer.clone()).write(&region, &params.output_path)?;

        Ok(PipelineReport {
            source_path: params.source_path.clone(),
            output_path: params.output_path.clone(),
            ingest,
            retention_times,
            mz_bins,
            resample,
            bounds,
            writer,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }
}

/// Stages 2 to 4 on already ingested spectra.
fn process_in_memory(
    spectra: &TimeIndexedSpectra,
    resampler: &Resampler,
    bounds: RegionBounds,
    observer: &mut dyn PipelineObserver,
) -> (ExportRegion, ResampleStats, usize, usize) {
    observer.on_event(&PipelineEvent::StageStarted(Stage::BuildMatrix));
    let table: DenseIntensityTable = MatrixBuilder::new().build(spectra);
    let (retention_times, mz_bins) = (table.n_rows(), table.n_cols());

    observer.on_event(&PipelineEvent::StageStarted(Stage::Resample));
    let (table, resample) = resampler.resample(table);

    observer.on_event(&PipelineEvent::StageStarted(Stage::ExtractRegion));
    let region = ExportRegion::extract(&table, bounds);

    (region, resample, retention_times, mz_bins)
}
