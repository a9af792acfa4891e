//! # mzroi - Resampled Region-of-Interest Tables from LC-MS Runs
//!
//! `mzroi` turns an mzML acquisition into a dense, uniformly sampled
//! retention time × integer m/z intensity table and exports a rectangular
//! region of it.
//!
//! ## Pipeline
//!
//! 1. **Ingest** ([`ingest`]): stream spectra from mzML, zero intensities
//!    below the noise floor (1000 by default) and merge spectra that share
//!    a retention time.
//! 2. **Bin** ([`matrix`]): round every m/z to the nearest integer and sum
//!    intensities per bin into a dense, zero-filled table.
//! 3. **Resample** ([`resample`]): pad every integer minute in a range up to
//!    a target number of rows by interpolating between neighbors.
//! 4. **Extract** ([`region`]): keep the rows and columns inside inclusive
//!    m/z and retention-time bounds.
//!
//! The result is written as CSV, TSV or Parquet by [`writer`]; [`pipeline`]
//! wires the stages together and can run them on a background thread.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mzroi::prelude::*;
//!
//! let params = PipelineParams::new("run.mzML", "eroi.csv", 20, 0, 30)
//!     .with_mz_range(100.0, 500.0);
//!
//! let report = Pipeline::new(params)?.run(&mut NoopObserver)?;
//! println!("{}", report.writer);
//! # Ok::<(), PipelineError>(())
//! ```
//!
//! ## Working in memory
//!
//! ```rust
//! use mzroi::prelude::*;
//!
//! let mut spectra = TimeIndexedSpectra::new();
//! spectra.insert(
//!     Spectrum {
//!         id: "scan=1".into(),
//!         retention_time: 1.0,
//!         mz: vec![100.1, 100.6],
//!         intensity: vec![2000.0, 1500.0],
//!     },
//!     MergeMode::Positional,
//! )?;
//!
//! let table = MatrixBuilder::new().build(&spectra);
//! assert_eq!(table.bins(), &[100, 101]);
//!
//! let (table, _) = Resampler::new(3, 1, 2)?.resample(table);
//! assert_eq!(table.n_rows(), 3);
//!
//! let region = ExportRegion::extract(&table, RegionBounds::new(100.0, 100.0, 0.0, 2.0)?);
//! assert_eq!(region.bins(), &[100]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod ingest;
pub mod matrix;
pub mod mzml;
pub mod pipeline;
pub mod region;
pub mod resample;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::ingest::{
        IngestConfig, IngestError, IngestStats, MergeMode, Spectrum, SpectrumIngestor,
        TimeIndexedSpectra, DEFAULT_NOISE_FLOOR,
    };
    pub use crate::matrix::{mz_bin, DenseIntensityTable, MatrixBuilder};
    pub use crate::mzml::{MzMLError, MzMLSpectrum, MzMLStreamer, MzMLSummary};
    pub use crate::pipeline::{
        NoopObserver, Pipeline, PipelineError, PipelineEvent, PipelineHandle, PipelineObserver,
        PipelineParams, PipelineReport, Stage,
    };
    pub use crate::region::{ExportRegion, RegionBounds, RegionError};
    pub use crate::resample::{
        insertion_offsets, ResampleError, ResampleStats, Resampler, MAX_TARGET_POINTS_PER_MINUTE,
    };
    pub use crate::writer::{OutputFormat, RegionWriter, WriterConfig, WriterError, WriterStats};
}
