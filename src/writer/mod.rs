//! # Region Writer
//!
//! Output boundary of the pipeline: serializes an [`ExportRegion`] as a
//! delimited text table (CSV/TSV) or a wide Parquet table.
//!
//! Every layout has the same shape: a leading `retention_time` column, then
//! one column per integer m/z bin in ascending order, one row per
//! retention time in table order.
//!
//! Files are first written to a temporary sibling of the destination and
//! renamed into place on success, so a failed export never leaves a
//! truncated table behind.

mod columnar;
mod config;
mod delimited;
mod error;
mod stats;


use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::region::ExportRegion;

pub use columnar::{metadata_keys, region_schema};
pub use config::{CompressionType, OutputFormat, WriterConfig};
pub use delimited::RETENTION_TIME_COLUMN;
pub use error::WriterError;
pub use stats::WriterStats;

/// Writes export regions to disk
#[derive(Debug, Clone, Default)]
pub struct RegionWriter {
    config: WriterConfig,
}

impl RegionWriter {
    /// Create a writer
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Format used for `path`: the configured one, else inferred from the extension
    pub fn resolve_format(&self, path: &Path) -> Result<OutputFormat, WriterError> {
        self.config
            .format
            .or_else(|| OutputFormat::from_path(path))
            .ok_or_else(|| WriterError::UnknownFormat(path.to_path_buf()))
    }

    /// Serialize `region` into any writer
    pub fn write_to<W: Write + Send>(
        &self,
        region: &ExportRegion,
        writer: W,
        format: OutputFormat,
    ) -> Result<(), WriterError> {
        match format.delimiter() {
            Some(delimiter) => delimited::write_delimited(region, writer, delimiter),
            None => columnar::write_parquet(region, writer, &self.config),
        }
    }

    /// Atomically write `region` to `path`, replacing any existing file
    pub fn write<P: AsRef<Path>>(
        &self,
        region: &ExportRegion,
        path: P,
    ) -> Result<WriterStats, WriterError> {
        let path = path.as_ref();
        let format = self.resolve_format(path)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        debug!("Staging {} output in {}", format, tmp.path().display());
        {
            let mut buffered = BufWriter::new(tmp.as_file_mut());
            self.write_to(region, &mut buffered, format)?;
            buffered.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;

        let stats = WriterStats {
            format,
            rows_written: region.n_rows(),
            columns_written: region.n_cols(),
            file_size_bytes: fs::metadata(path)?.len(),
        };
        info!("{} to {}", stats, path.display());
        Ok(stats)
    }
}
