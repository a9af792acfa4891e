use std::io::Write;

use crate::region::ExportRegion;

use super::error::WriterError;

/// Name of the leading column holding each row's retention time
pub const RETENTION_TIME_COLUMN: &str = "retention_time";

/// Write `region` as delimited text: a header of `retention_time` followed
/// by the bins, then one record per row.
///
/// Values use Rust's shortest round-trip float formatting, so identical
/// tables always produce identical bytes.
pub(super) fn write_delimited<W: Write>(
    region: &ExportRegion,
    writer: W,
    delimiter: u8,
) -> Result<(), WriterError> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(writer);

    let mut record = Vec::with_capacity(region.n_cols() + 1);
    record.push(RETENTION_TIME_COLUMN.to_string());
    record.extend(region.bins().iter().map(i64::to_string));
    out.write_record(&record)?;

    for (rt, values) in region.table().iter_rows() {
        record.clear();
        record.push(rt.to_string());
        record.extend(values.iter().map(f64::to_string));
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}
