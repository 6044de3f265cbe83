//! Per-site bundle assembly and decorated CSV export

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;

use crate::query::{Collection, Domain, QueryError};
use crate::store::{ResourceStore, TimeSelector};

#[cfg(test)]
mod tests;

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("Invalid destination: {0}")]
    Destination(String),
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Named time series for one site plus the one-row snapshot of its site
/// record. Ephemeral; lives only for the duration of an export.
#[derive(Clone, Debug)]
pub struct SiteBundle {
    pub gid: usize,
    /// Variable columns, one row per timestamp. No time column; rows are in
    /// time-axis order.
    pub series: RecordBatch,
    /// One-row site record, gid included.
    pub record: RecordBatch,
}

impl SiteBundle {
    /// Identifier used to name the exported file when the destination is a
    /// directory.
    pub fn name(&self) -> String {
        format!("site_{}", self.gid)
    }
}

impl<S: ResourceStore> Collection<S> {
    /// Gather one full-axis series per dataset for `gid`, all sharing the
    /// collection's time axis, plus the one-row site record.
    pub fn build_bundle(&self, gid: usize, datasets: &[String]) -> ExportResult<SiteBundle> {
        let mut fields = Vec::with_capacity(datasets.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(datasets.len());
        for name in datasets {
            let column = self
                .store()
                .dataset_column(name, &TimeSelector::All, gid)
                .map_err(QueryError::from)?;
            fields.push(Field::new(name, DataType::Float64, true));
            arrays.push(Arc::new(column));
        }
        let series = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        let record = self.site_table().record(gid).map_err(QueryError::from)?;
        Ok(SiteBundle {
            gid,
            series,
            record,
        })
    }

    /// Bundle with the collection domain's default variable set.
    pub fn bundle(&self, gid: usize) -> ExportResult<SiteBundle> {
        self.build_bundle(gid, &self.domain().bundle_datasets())
    }

    /// Wind bundle at a specific hub height, e.g. `wind_bundle(gid, 100)`
    /// for the 100 m variable set.
    pub fn wind_bundle(&self, gid: usize, hub_height: u32) -> ExportResult<SiteBundle> {
        self.build_bundle(gid, &Domain::wind_datasets(hub_height))
    }

    /// [`Collection::bundle`] for the site nearest to `(lat, lon)`.
    pub fn bundle_at(&self, coord: (f64, f64)) -> ExportResult<SiteBundle> {
        let gid = self.nearest_site(coord)?;
        self.bundle(gid)
    }

    /// [`Collection::wind_bundle`] for the site nearest to `(lat, lon)`.
    pub fn wind_bundle_at(&self, coord: (f64, f64), hub_height: u32) -> ExportResult<SiteBundle> {
        let gid = self.nearest_site(coord)?;
        self.wind_bundle(gid, hub_height)
    }

    /// Build and export one bundle per gid, in input order. Errors carry
    /// the failing gid's cause, so batch callers can skip or abort.
    pub fn export_bundles(
        &self,
        gids: &[usize],
        datasets: &[String],
        dest: &Path,
    ) -> ExportResult<Vec<SiteBundle>> {
        let mut bundles = Vec::with_capacity(gids.len());
        for &gid in gids {
            let bundle = self.build_bundle(gid, datasets)?;
            export(&bundle, dest)?;
            bundles.push(bundle);
        }
        Ok(bundles)
    }
}

/// Write `bundle` as delimited text: two site-record header lines, the
/// variable-name header, then one row per timestamp. Returns the path
/// written.
///
/// A destination without a `.csv` extension is treated as a directory and
/// the file is named from the bundle identifier; a destination that is
/// neither is rejected up front.
pub fn export(bundle: &SiteBundle, dest: &Path) -> ExportResult<PathBuf> {
    let path = resolve_destination(bundle, dest)?;

    let mut writer = csv::Writer::from_path(&path)?;
    let names: Vec<String> = bundle
        .series
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    writer.write_record(&names)?;
    for row in 0..bundle.series.num_rows() {
        let mut values = Vec::with_capacity(names.len());
        for column in bundle.series.columns() {
            values.push(array_value_to_string(column, row)?);
        }
        writer.write_record(&values)?;
    }
    writer.flush()?;
    drop(writer);

    // Read-modify-write: prepend the renamed site attributes. Data rows
    // stay intact and unreordered below the two new lines.
    let (columns, values) = record_header(&bundle.record)?;
    let content = fs::read_to_string(&path)?;
    fs::write(&path, format!("{columns}\n{values}\n{content}"))?;

    Ok(path)
}

fn resolve_destination(bundle: &SiteBundle, dest: &Path) -> ExportResult<PathBuf> {
    if dest.extension().is_some_and(|ext| ext == "csv") {
        Ok(dest.to_path_buf())
    } else if dest.is_dir() {
        Ok(dest.join(format!("{}.csv", bundle.name())))
    } else {
        Err(ExportError::Destination(format!(
            "{} is neither a .csv path nor an existing directory",
            dest.display()
        )))
    }
}

/// The two prepended lines from the one-row site record, with the fixed
/// export renames applied. Fields go through the csv writer, so attribute
/// values containing delimiters stay quoted like the data rows.
fn record_header(record: &RecordBatch) -> ExportResult<(String, String)> {
    let mut columns = Vec::with_capacity(record.num_columns());
    let mut values = Vec::with_capacity(record.num_columns());
    for (field, column) in record.schema().fields().iter().zip(record.columns()) {
        columns.push(rename_column(field.name()));
        values.push(array_value_to_string(column, 0)?);
    }
    Ok((csv_line(&columns)?, csv_line(&values)?))
}

fn csv_line(fields: &[String]) -> ExportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields)?;
    let bytes = writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}

fn rename_column(name: &str) -> String {
    match name {
        "timezone" => "Time Zone".to_string(),
        "gid" => "Location ID".to_string(),
        _ => capitalize(name),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
