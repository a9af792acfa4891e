use std::path::PathBuf;

/// Errors that can occur while writing an export region
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the csv crate
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from the Arrow library during array operations
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Error from the Parquet library during file writing
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// The destination extension names no known format
    #[error("cannot infer output format from {0}; use .csv, .tsv, .txt or .parquet")]
    UnknownFormat(PathBuf),
}

impl From<tempfile::PersistError> for WriterError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::IoError(err.error)
    }
}
