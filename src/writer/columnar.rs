use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::region::ExportRegion;

use super::config::WriterConfig;
use super::delimited::RETENTION_TIME_COLUMN;
use super::error::WriterError;

/// Footer metadata keys
pub mod metadata_keys {
    /// Producing library version
    pub const VERSION: &str = "mzroi:version";
    /// Lower m/z bound of the export
    pub const MZ_MIN: &str = "mzroi:mz_min";
    /// Upper m/z bound of the export
    pub const MZ_MAX: &str = "mzroi:mz_max";
    /// Lower retention-time bound of the export
    pub const RT_START: &str = "mzroi:rt_start";
    /// Upper retention-time bound of the export
    pub const RT_END: &str = "mzroi:rt_end";
}

/// Arrow schema of an exported region: `retention_time` then one column per bin
pub fn region_schema(bins: &[i64]) -> Schema {
    let mut fields = Vec::with_capacity(bins.len() + 1);
    fields.push(Field::new(RETENTION_TIME_COLUMN, DataType::Float64, false));
    fields.extend(
        bins.iter()
            .map(|bin| Field::new(bin.to_string(), DataType::Float64, false)),
    );
    Schema::new(fields)
}

fn region_metadata(region: &ExportRegion) -> HashMap<String, String> {
    let bounds = region.bounds();
    HashMap::from([
        (
            metadata_keys::VERSION.to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        ),
        (metadata_keys::MZ_MIN.to_string(), bounds.mz_min.to_string()),
        (metadata_keys::MZ_MAX.to_string(), bounds.mz_max.to_string()),
        (metadata_keys::RT_START.to_string(), bounds.rt_start.to_string()),
        (metadata_keys::RT_END.to_string(), bounds.rt_end.to_string()),
    ])
}

/// Build a Float64 array using append_slice for memcpy speed
#[inline]
fn build_f64_array(data: &[f64]) -> ArrayRef {
    let mut builder = Float64Builder::with_capacity(data.len());
    builder.append_slice(data);
    Arc::new(builder.finish())
}

/// Write `region` as a single-batch wide Parquet table
pub(super) fn write_parquet<W: Write + Send>(
    region: &ExportRegion,
    writer: W,
    config: &WriterConfig,
) -> Result<(), WriterError> {
    let table = region.table();
    let schema = Arc::new(region_schema(table.bins()));
    let props = config.to_writer_properties(&region_metadata(region));

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(table.n_cols() + 1);
    columns.push(build_f64_array(table.retention_times()));
    for col in 0..table.n_cols() {
        let values: Vec<f64> = table.iter_rows().map(|(_, row)| row[col]).collect();
        columns.push(build_f64_array(&values));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let mut arrow_writer = ArrowWriter::try_new(writer, schema, Some(props))?;
    arrow_writer.write(&batch)?;
    arrow_writer.close()?;
    Ok(())
}
