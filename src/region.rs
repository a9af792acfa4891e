//! Rectangular region extraction (eROI).

use log::warn;
use serde::{Deserialize, Serialize};

use crate::matrix::DenseIntensityTable;

/// Errors raised for unusable region bounds
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegionError {
    /// A bound is NaN or the range is inverted
    #[error("invalid range: {0}")]
    InvalidRange(String),
}

/// Inclusive m/z and retention-time bounds of an export region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    /// Smallest m/z bin kept
    pub mz_min: f64,
    /// Largest m/z bin kept
    pub mz_max: f64,
    /// Earliest retention time kept, minutes
    pub rt_start: f64,
    /// Latest retention time kept, minutes
    pub rt_end: f64,
}

impl Default for RegionBounds {
    fn default() -> Self {
        Self {
            mz_min: 0.0,
            mz_max: f64::INFINITY,
            rt_start: f64::NEG_INFINITY,
            rt_end: f64::INFINITY,
        }
    }
}

impl RegionBounds {
    /// Validated bounds. Infinite bounds are allowed; NaN is not.
    pub fn new(mz_min: f64, mz_max: f64, rt_start: f64, rt_end: f64) -> Result<Self, RegionError> {
        let bounds = Self {
            mz_min,
            mz_max,
            rt_start,
            rt_end,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check the bounds, e.g. after deserializing them
    pub fn validate(&self) -> Result<(), RegionError> {
        if [self.mz_min, self.mz_max, self.rt_start, self.rt_end]
            .iter()
            .any(|v| v.is_nan())
        {
            return Err(RegionError::InvalidRange(
                "region bounds must be numbers".to_string(),
            ));
        }
        if self.mz_min > self.mz_max {
            return Err(RegionError::InvalidRange(format!(
                "m/z minimum {} exceeds maximum {}",
                self.mz_min, self.mz_max
            )));
        }
        if self.rt_start > self.rt_end {
            return Err(RegionError::InvalidRange(format!(
                "retention time start {} exceeds end {}",
                self.rt_start, self.rt_end
            )));
        }
        Ok(())
    }

    /// Whether a column bin lies inside the m/z bounds
    pub fn contains_bin(&self, bin: i64) -> bool {
        let bin = bin as f64;
        self.mz_min <= bin && bin <= self.mz_max
    }

    /// Whether a retention time lies inside the time bounds
    pub fn contains_rt(&self, rt: f64) -> bool {
        self.rt_start <= rt && rt <= self.rt_end
    }
}

/// The extracted sub-table, ready for the output boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRegion {
    bounds: RegionBounds,
    table: DenseIntensityTable,
}

impl ExportRegion {
    /// Keep the rows and columns of `table` that fall inside `bounds`,
    /// preserving their order.
    pub fn extract(table: &DenseIntensityTable, bounds: RegionBounds) -> Self {
        let columns: Vec<usize> = table
            .bins()
            .iter()
            .enumerate()
            .filter(|(_, &bin)| bounds.contains_bin(bin))
            .map(|(i, _)| i)
            .collect();
        let bins = columns.iter().map(|&i| table.bins()[i]).collect();

        let mut retention_times = Vec::new();
        let mut rows = Vec::new();
        for (rt, values) in table.iter_rows() {
            if bounds.contains_rt(rt) {
                retention_times.push(rt);
                rows.push(columns.iter().map(|&i| values[i]).collect());
            }
        }

        if rows.is_empty() || columns.is_empty() {
            warn!(
                "Export region m/z [{}, {}] x rt [{}, {}] is empty",
                bounds.mz_min, bounds.mz_max, bounds.rt_start, bounds.rt_end
            );
        }

        Self {
            bounds,
            table: DenseIntensityTable::from_parts_unchecked(bins, retention_times, rows),
        }
    }

    /// Bounds used for extraction
    pub fn bounds(&self) -> &RegionBounds {
        &self.bounds
    }

    /// The extracted cells
    pub fn table(&self) -> &DenseIntensityTable {
        &self.table
    }

    /// Column bins
    pub fn bins(&self) -> &[i64] {
        self.table.bins()
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.table.n_rows()
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.table.n_cols()
    }
}
