use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow_array::StringArray;

use super::Error;

/// Immutable per-site metadata table. The site gid is the row position and
/// stays stable for the table's life; it is the join key into every
/// dataset's site axis.
#[derive(Clone, Debug)]
pub struct SiteTable {
    meta: RecordBatch,
}

impl SiteTable {
    pub fn new(meta: RecordBatch) -> Self {
        Self { meta }
    }

    pub fn len(&self) -> usize {
        self.meta.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.meta.num_rows() == 0
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.meta
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.meta.schema().index_of(name).is_ok()
    }

    /// One-row snapshot for `gid`, with the gid materialized as a leading
    /// column when the table does not already carry one.
    pub fn record(&self, gid: usize) -> Result<RecordBatch, Error> {
        if gid >= self.len() {
            return Err(Error::SiteOutOfRange {
                gid,
                len: self.len(),
            });
        }
        let row = self.meta.slice(gid, 1);
        if self.has_column("gid") {
            return Ok(row);
        }

        let mut fields = vec![Field::new("gid", DataType::UInt64, false)];
        fields.extend(row.schema().fields().iter().map(|f| f.as_ref().clone()));
        let mut columns: Vec<ArrayRef> = vec![Arc::new(UInt64Array::from(vec![gid as u64]))];
        columns.extend(row.columns().iter().cloned());

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }

    /// (lat, lon) pairs for every site. Coordinate columns are discovered by
    /// case-insensitive prefix ("lat"/"lon"), first match per axis, falling
    /// back to `latitude`/`longitude`.
    pub fn lat_lon(&self) -> Result<Vec<[f64; 2]>, Error> {
        let schema = self.meta.schema();
        let mut lat_name = None;
        let mut lon_name = None;
        for field in schema.fields() {
            let lower = field.name().to_lowercase();
            if lat_name.is_none() && lower.starts_with("lat") {
                lat_name = Some(field.name().clone());
            } else if lon_name.is_none() && lower.starts_with("lon") {
                lon_name = Some(field.name().clone());
            }
        }

        let lat = self.f64_column(lat_name.as_deref().unwrap_or("latitude"))?;
        let lon = self.f64_column(lon_name.as_deref().unwrap_or("longitude"))?;
        Ok(lat
            .values()
            .iter()
            .zip(lon.values().iter())
            .map(|(&lat, &lon)| [lat, lon])
            .collect())
    }

    /// Gids whose `column` value equals `value`, in ascending table order.
    /// A missing column or zero matches yields an empty vec, not an error.
    pub fn region_gids(&self, value: &str, column: &str) -> Vec<usize> {
        let Some(col) = self.meta.column_by_name(column) else {
            return Vec::new();
        };
        let Some(strings) = col.as_any().downcast_ref::<StringArray>() else {
            return Vec::new();
        };
        (0..strings.len())
            .filter(|&i| !strings.is_null(i) && strings.value(i) == value)
            .collect()
    }

    /// Distinct values of `column` in first-seen order; None when the table
    /// has no such column.
    pub fn distinct(&self, column: &str) -> Option<Vec<String>> {
        let col = self.meta.column_by_name(column)?;
        let strings = col.as_any().downcast_ref::<StringArray>()?;
        let mut values: Vec<String> = Vec::new();
        for i in 0..strings.len() {
            if strings.is_null(i) {
                continue;
            }
            let v = strings.value(i);
            if !values.iter().any(|seen| seen == v) {
                values.push(v.to_string());
            }
        }
        Some(values)
    }

    /// Stitch shard tables in order; all shards must share one schema.
    pub fn concat(tables: &[&SiteTable]) -> Result<SiteTable, Error> {
        let schema = tables
            .first()
            .ok_or_else(|| Error::ShardMismatch("no shards to concatenate".into()))?
            .batch()
            .schema();
        let batches: Vec<&RecordBatch> = tables.iter().map(|t| t.batch()).collect();
        let combined = arrow::compute::concat_batches(&schema, batches)?;
        Ok(SiteTable::new(combined))
    }

    fn f64_column(&self, name: &str) -> Result<&Float64Array, Error> {
        let col = self
            .meta
            .column_by_name(name)
            .ok_or_else(|| Error::MetaColumn(format!("missing column {name}")))?;
        col.as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| Error::MetaColumn(format!("column {name} is not Float64")))
    }
}
