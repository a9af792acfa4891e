//! Temporal resampling onto a minimum per-minute row density.
//!
//! Rows are grouped into integer-minute buckets by the floor of their
//! retention time. A bucket holding fewer rows than the target receives
//! synthetic rows, each the average of the two rows around its insertion
//! point. Original rows are never moved or reordered.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::matrix::DenseIntensityTable;

/// Errors raised by the resampler
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResampleError {
    /// Target density or minute range is unusable
    #[error("invalid resampling parameter: {0}")]
    InvalidParameter(String),
}

/// Offsets into a bucket of `existing` rows before which synthetic rows go.
///
/// Offset `k` (for `k = 1..=target-existing`) is `floor(k * existing / (deficit + 1))`.
/// Colliding offsets are kept, so every missing row is produced. An empty
/// bucket has nowhere to interpolate and gets no offsets.
pub fn insertion_offsets(existing: usize, target: usize) -> Vec<usize> {
    if existing == 0 || existing >= target {
        return Vec::new();
    }
    let deficit = target - existing;
    (1..=deficit).map(|k| k * existing / (deficit + 1)).collect()
}

/// Counters describing one resampling pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResampleStats {
    /// Rows before resampling
    pub rows_in: usize,
    /// Rows after resampling
    pub rows_out: usize,
    /// Buckets in range holding at least one row
    pub buckets_populated: usize,
    /// Buckets that received synthetic rows
    pub buckets_padded: usize,
}

impl ResampleStats {
    /// Number of synthetic rows inserted
    pub fn rows_inserted(&self) -> usize {
        self.rows_out - self.rows_in
    }
}

/// Largest accepted target density; every synthetic row is materialized
pub const MAX_TARGET_POINTS_PER_MINUTE: i64 = 100_000;

/// Stage 3 of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resampler {
    target: usize,
    start_minute: i64,
    end_minute: i64,
}

impl Resampler {
    /// Resample buckets `[start_minute, end_minute)` to at least `target` rows each.
    pub fn new(target: i64, start_minute: i64, end_minute: i64) -> Result<Self, ResampleError> {
        if target <= 0 {
            return Err(ResampleError::InvalidParameter(format!(
                "target points per minute must be positive, got {target}"
            )));
        }
        if target > MAX_TARGET_POINTS_PER_MINUTE {
            return Err(ResampleError::InvalidParameter(format!(
                "target points per minute {target} exceeds the maximum of {MAX_TARGET_POINTS_PER_MINUTE}"
            )));
        }
        if start_minute >= end_minute {
            return Err(ResampleError::InvalidParameter(format!(
                "minute range start {start_minute} must be less than end {end_minute}"
            )));
        }
        let target = usize::try_from(target).map_err(|_| {
            ResampleError::InvalidParameter(format!("target {target} does not fit in memory"))
        })?;

        Ok(Self {
            target,
            start_minute,
            end_minute,
        })
    }

    /// Target rows per bucket
    pub fn target(&self) -> usize {
        self.target
    }

    /// Global row positions before which synthetic rows are inserted,
    /// one entry per synthetic row.
    pub fn insertion_points(&self, table: &DenseIntensityTable) -> Vec<usize> {
        let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (index, rt) in table.retention_times().iter().enumerate() {
            let minute = rt.floor();
            if minute >= self.start_minute as f64 && minute < self.end_minute as f64 {
                buckets.entry(minute as i64).or_default().push(index);
            }
        }

        let mut points = Vec::new();
        for (minute, existing) in &buckets {
            let offsets = insertion_offsets(existing.len(), self.target);
            if !offsets.is_empty() {
                debug!(
                    "Minute {minute}: {} rows, inserting {} before offsets {offsets:?}",
                    existing.len(),
                    offsets.len()
                );
            }
            points.extend(offsets.into_iter().map(|offset| existing[offset]));
        }
        points
    }

    /// Insert synthetic rows into `table`.
    ///
    /// Inserting at position 0 copies the first row; elsewhere the new row is
    /// the mean of the original rows at `p - 1` and `p`, retention time
    /// included. Rows of adjacent buckets are valid neighbors.
    pub fn resample(
        &self,
        table: DenseIntensityTable,
    ) -> (DenseIntensityTable, ResampleStats) {
        let points = self.insertion_points(&table);
        let rows_in = table.n_rows();

        let mut stats = ResampleStats {
            rows_in,
            rows_out: rows_in,
            buckets_populated: table
                .retention_times()
                .iter()
                .map(|rt| rt.floor())
                .filter(|m| *m >= self.start_minute as f64 && *m < self.end_minute as f64)
                .map(|m| m as i64)
                .collect::<BTreeSet<_>>()
                .len(),
            buckets_padded: 0,
        };

        if points.is_empty() {
            info!("Resampling: every populated minute already has {} rows", self.target);
            return (table, stats);
        }

        stats.buckets_padded = points
            .iter()
            .map(|&p| table.retention_times()[p].floor() as i64)
            .collect::<BTreeSet<_>>()
            .len();

        // Applying all insertions against the original rows is the same as
        // inserting one at a time in descending position order.
        let mut pending = vec![0usize; rows_in + 1];
        for &p in &points {
            pending[p.min(rows_in)] += 1;
        }

        let synthetic: Vec<Option<(f64, Vec<f64>)>> = {
            let (times, rows) = (table.retention_times(), table_rows(&table));
            pending
                .iter()
                .enumerate()
                .map(|(position, &count)| (count > 0).then(|| synthetic_row(times, &rows, position)))
                .collect()
        };

        let (bins, times, rows) = table.into_parts();
        let total = rows_in + points.len();
        let mut out_times = Vec::with_capacity(total);
        let mut out_rows = Vec::with_capacity(total);
        let mut originals = times.into_iter().zip(rows);

        for (position, row) in synthetic.into_iter().enumerate() {
            if let Some((rt, values)) = row {
                for _ in 0..pending[position] {
                    out_times.push(rt);
                    out_rows.push(values.clone());
                }
            }
            if let Some((rt, values)) = originals.next() {
                out_times.push(rt);
                out_rows.push(values);
            }
        }

        stats.rows_out = out_rows.len();
        info!(
            "Resampling: inserted {} rows across {} minutes ({} -> {} rows)",
            stats.rows_inserted(),
            stats.buckets_padded,
            stats.rows_in,
            stats.rows_out
        );

        (
            DenseIntensityTable::from_parts_unchecked(bins, out_times, out_rows),
            stats,
        )
    }
}

fn table_rows(table: &DenseIntensityTable) -> Vec<&[f64]> {
    (0..table.n_rows()).filter_map(|i| table.row(i)).collect()
}

fn synthetic_row(times: &[f64], rows: &[&[f64]], position: usize) -> (f64, Vec<f64>) {
    let last = rows.len() - 1;
    if position == 0 {
        (times[0], rows[0].to_vec())
    } else if position > last {
        (times[last], rows[last].to_vec())
    } else {
        let (before, after) = (rows[position - 1], rows[position]);
        let rt = (times[position - 1] + times[position]) / 2.0;
        let values = before
            .iter()
            .zip(after)
            .map(|(a, b)| (a + b) / 2.0)
            .collect();
        (rt, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(f64, f64)]) -> DenseIntensityTable {
        DenseIntensityTable::from_rows(
            vec![100, 101],
            rows.iter().map(|&(rt, v)| (rt, vec![v, v * 2.0])),
        )
        .unwrap()
    }

    #[test]
    fn test_offsets_follow_linear_subdivision() {
        // 2 rows, target 5: positions 0.5, 1.0, 1.5
        assert_eq!(insertion_offsets(2, 5), vec![0, 1, 1]);
        assert_eq!(insertion_offsets(3, 4), vec![1]);
        assert_eq!(insertion_offsets(1, 3), vec![0, 0]);
        assert_eq!(insertion_offsets(4, 7), vec![1, 2, 3]);
    }

    #[test]
    fn test_no_offsets_when_bucket_is_full_or_empty() {
        assert!(insertion_offsets(5, 5).is_empty());
        assert!(insertion_offsets(6, 5).is_empty());
        assert!(insertion_offsets(0, 5).is_empty());
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            Resampler::new(0, 0, 10),
            Err(ResampleError::InvalidParameter(_))
        ));
        assert!(matches!(
            Resampler::new(-3, 0, 10),
            Err(ResampleError::InvalidParameter(_))
        ));
        assert!(matches!(
            Resampler::new(5, 4, 4),
            Err(ResampleError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_target_beyond_maximum() {
        assert!(Resampler::new(MAX_TARGET_POINTS_PER_MINUTE, 0, 1).is_ok());
        assert!(matches!(
            Resampler::new(MAX_TARGET_POINTS_PER_MINUTE + 1, 0, 1),
            Err(ResampleError::InvalidParameter(_))
        ));
        assert!(matches!(
            Resampler::new(1 << 40, 0, 1),
            Err(ResampleError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_minute_three_with_two_rows_and_target_five() {
        let input = table(&[(2.5, 10.0), (3.25, 20.0), (3.75, 40.0), (4.25, 80.0)]);
        let resampler = Resampler::new(5, 3, 4).unwrap();

        assert_eq!(resampler.insertion_points(&input), vec![1, 2, 2]);

        let (output, stats) = resampler.resample(input);
        assert_eq!(stats.rows_inserted(), 3);
        assert_eq!(stats.buckets_padded, 1);
        assert_eq!(
            output.retention_times(),
            &[2.5, 2.875, 3.25, 3.5, 3.5, 3.75, 4.25]
        );
        assert_eq!(output.row(1), Some(&[15.0, 30.0][..]));
        assert_eq!(output.row(3), Some(&[30.0, 60.0][..]));
        assert_eq!(output.row(4), Some(&[30.0, 60.0][..]));
    }

    #[test]
    fn test_full_buckets_are_untouched() {
        let input = table(&[(1.1, 1.0), (1.5, 2.0), (1.9, 3.0)]);
        let (output, stats) = Resampler::new(3, 0, 5).unwrap().resample(input.clone());
        assert_eq!(output, input);
        assert_eq!(stats.rows_inserted(), 0);
        assert_eq!(stats.buckets_populated, 1);
    }

    #[test]
    fn test_insertion_before_first_row_copies_it() {
        let input = table(&[(0.4, 8.0), (1.2, 4.0)]);
        let (output, _) = Resampler::new(2, 0, 1).unwrap().resample(input);
        assert_eq!(output.retention_times(), &[0.4, 0.4, 1.2]);
        assert_eq!(output.row(0), output.row(1));
    }

    #[test]
    fn test_minutes_outside_range_are_ignored() {
        let input = table(&[(0.5, 1.0), (5.5, 2.0)]);
        let (output, stats) = Resampler::new(4, 1, 5).unwrap().resample(input.clone());
        assert_eq!(output, input);
        assert_eq!(stats.buckets_populated, 0);
    }

    #[test]
    fn test_non_monotonic_rows_keep_their_order() {
        let input = table(&[(2.75, 1.0), (2.25, 3.0)]);
        let (output, _) = Resampler::new(3, 2, 3).unwrap().resample(input);
        assert_eq!(output.retention_times(), &[2.75, 2.5, 2.25]);
        assert_eq!(output.row(1), Some(&[2.0, 4.0][..]));
    }

    #[test]
    fn test_interpolated_rows_can_land_in_previous_minute() {
        let rows: Vec<(f64, f64)> = (0..6).map(|i| (f64::from(i) * 0.5, 1000.0)).collect();
        let (output, stats) = Resampler::new(4, 0, 3).unwrap().resample(table(&rows));

        assert_eq!(stats.rows_inserted(), 6);
        assert_eq!(
            output.retention_times(),
            &[0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0, 2.25, 2.5]
        );
    }

    #[test]
    fn test_empty_table_passes_through() {
        let (output, stats) = Resampler::new(3, 0, 10)
            .unwrap()
            .resample(DenseIntensityTable::default());
        assert!(output.is_empty());
        assert_eq!(stats, ResampleStats::default());
    }
}
