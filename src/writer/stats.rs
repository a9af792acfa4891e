use std::fmt;

use serde::{Deserialize, Serialize};

use super::OutputFormat;

/// Statistics from a completed write operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterStats {
    /// Format that was written
    pub format: OutputFormat,
    /// Number of retention-time rows written
    pub rows_written: usize,
    /// Number of m/z bin columns written, excluding the retention time
    pub columns_written: usize,
    /// Total file size in bytes
    pub file_size_bytes: u64,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} rows x {} m/z bins as {} ({} bytes)",
            self.rows_written, self.columns_written, self.format, self.file_size_bytes
        )
    }
}
