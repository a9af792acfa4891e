//! Dense retention-time × integer m/z intensity table.
//!
//! Every m/z value is assigned to the integer bin it rounds to
//! (half away from zero, so 100.5 → 101 and -0.5 → -1). Columns are the
//! union of all bins observed in the run, sorted ascending; cells a row
//! never observed are zero.

use std::collections::{BTreeSet, HashMap};

use log::{debug, info};

use crate::ingest::TimeIndexedSpectra;

/// Integer bin of an m/z value, `None` for NaN and infinities.
#[inline]
pub fn mz_bin(mz: f64) -> Option<i64> {
    if mz.is_finite() {
        Some(mz.round() as i64)
    } else {
        None
    }
}

/// Errors raised when assembling a table from raw parts
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MatrixError {
    /// A row does not have one value per column
    #[error("row {row} has {actual} values, expected {expected}")]
    RaggedRow {
        /// Row position
        row: usize,
        /// Number of columns
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// Column bins are not strictly ascending
    #[error("column bins must be strictly ascending")]
    UnsortedBins,
}

/// Dense intensity table: rows are retention times, columns integer m/z bins.
///
/// Rows keep the order they were added in; nothing sorts them by time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseIntensityTable {
    bins: Vec<i64>,
    retention_times: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

impl DenseIntensityTable {
    /// Create a table with the given columns and no rows
    pub fn with_bins(bins: Vec<i64>) -> Result<Self, MatrixError> {
        if bins.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MatrixError::UnsortedBins);
        }
        Ok(Self {
            bins,
            retention_times: Vec::new(),
            rows: Vec::new(),
        })
    }

    /// Assemble a table from columns and `(retention time, values)` rows
    pub fn from_rows<I>(bins: Vec<i64>, rows: I) -> Result<Self, MatrixError>
    where
        I: IntoIterator<Item = (f64, Vec<f64>)>,
    {
        let mut table = Self::with_bins(bins)?;
        for (rt, values) in rows {
            table.push_row(rt, values)?;
        }
        Ok(table)
    }

    /// Append a row; it must have one value per column
    pub fn push_row(&mut self, retention_time: f64, values: Vec<f64>) -> Result<(), MatrixError> {
        if values.len() != self.bins.len() {
            return Err(MatrixError::RaggedRow {
                row: self.rows.len(),
                expected: self.bins.len(),
                actual: values.len(),
            });
        }
        self.retention_times.push(retention_time);
        self.rows.push(values);
        Ok(())
    }

    /// Column bins, strictly ascending
    pub fn bins(&self) -> &[i64] {
        &self.bins
    }

    /// Row retention times in table order
    pub fn retention_times(&self) -> &[f64] {
        &self.retention_times
    }

    /// Intensity values of one row
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Iterate `(retention time, values)` pairs in table order
    pub fn iter_rows(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.retention_times
            .iter()
            .copied()
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Position of a bin among the columns
    pub fn column_of(&self, bin: i64) -> Option<usize> {
        self.bins.binary_search(&bin).ok()
    }

    /// Cell value by row position and bin
    pub fn value(&self, row: usize, bin: i64) -> Option<f64> {
        let col = self.column_of(bin)?;
        self.rows.get(row).map(|values| values[col])
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.bins.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decompose into (bins, retention times, rows)
    pub fn into_parts(self) -> (Vec<i64>, Vec<f64>, Vec<Vec<f64>>) {
        (self.bins, self.retention_times, self.rows)
    }

    /// Rebuild from parts that already satisfy the shape invariants
    pub(crate) fn from_parts_unchecked(
        bins: Vec<i64>,
        retention_times: Vec<f64>,
        rows: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(retention_times.len(), rows.len());
        debug_assert!(rows.iter().all(|r| r.len() == bins.len()));
        Self {
            bins,
            retention_times,
            rows,
        }
    }
}

/// Stage 2 of the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixBuilder;

impl MatrixBuilder {
    /// Create a builder
    pub fn new() -> Self {
        Self
    }

    /// Bin every retention time of `spectra` into a dense table.
    ///
    /// All m/z values contribute a column, including those left without a
    /// paired intensity by a positional merge.
    pub fn build(&self, spectra: &TimeIndexedSpectra) -> DenseIntensityTable {
        let bins: Vec<i64> = spectra
            .iter()
            .flat_map(|entry| entry.mz.iter().copied().filter_map(mz_bin))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns: HashMap<i64, usize> =
            bins.iter().enumerate().map(|(i, &bin)| (bin, i)).collect();

        let mut retention_times = Vec::with_capacity(spectra.len());
        let mut rows = Vec::with_capacity(spectra.len());
        for entry in spectra {
            let mut row = vec![0.0; bins.len()];
            for (mz, intensity) in entry.points() {
                if let Some(col) = mz_bin(mz).and_then(|bin| columns.get(&bin)) {
                    row[*col] += intensity;
                }
            }
            retention_times.push(entry.retention_time);
            rows.push(row);
        }

        if bins.is_empty() {
            debug!("No m/z values observed, table has no columns");
        }
        info!(
            "Built dense table: {} retention times x {} m/z bins",
            rows.len(),
            bins.len()
        );

        DenseIntensityTable::from_parts_unchecked(bins, retention_times, rows)
    }
}
