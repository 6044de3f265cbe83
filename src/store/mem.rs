use std::collections::HashMap;

use arrow::array::Float64Array;
use arrow::record_batch::RecordBatch;

use super::{Error, ResourceStore, SiteSelector, SiteTable, TimeAxis, TimeSelector};

/// In-memory resource store: one `Float64Array` per (dataset, site),
/// every column spanning the full time axis. The crate's single-file
/// analog and the substrate the shard composites stack on.
#[derive(Clone, Debug)]
pub struct MemStore {
    table: SiteTable,
    axis: TimeAxis,
    datasets: HashMap<String, Vec<Float64Array>>,
    coords: Option<Vec<[f64; 2]>>,
}

impl MemStore {
    pub fn builder() -> MemStoreBuilder {
        MemStoreBuilder::default()
    }
}

impl ResourceStore for MemStore {
    fn site_table(&self) -> &SiteTable {
        &self.table
    }

    fn time_axis(&self) -> &TimeAxis {
        &self.axis
    }

    fn dataset_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.datasets.keys().cloned().collect();
        names.sort();
        names
    }

    fn coordinates(&self) -> Option<Vec<[f64; 2]>> {
        self.coords.clone()
    }

    fn dataset_slice(
        &self,
        name: &str,
        time: &TimeSelector,
        sites: &SiteSelector,
    ) -> Result<Vec<Float64Array>, Error> {
        let columns = self
            .datasets
            .get(name)
            .ok_or_else(|| Error::UnknownDataset(name.to_string()))?;
        time.validate(self.axis.len())?;
        let gids = sites.resolve(self.table.len())?;

        Ok(gids
            .into_iter()
            .map(|gid| {
                let col = &columns[gid];
                match time {
                    TimeSelector::All => col.clone(),
                    TimeSelector::At(i) => col.slice(*i, 1),
                    TimeSelector::Span(r) => col.slice(r.start, r.end - r.start),
                }
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MemStoreBuilder {
    meta: Option<RecordBatch>,
    axis: Option<TimeAxis>,
    coords: Option<Vec<[f64; 2]>>,
    datasets: HashMap<String, Vec<Float64Array>>,
}

impl MemStoreBuilder {
    pub fn meta(mut self, meta: RecordBatch) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn time_axis(mut self, axis: TimeAxis) -> Self {
        self.axis = Some(axis);
        self
    }

    /// Direct coordinates field; optional, the site table columns are the
    /// fallback.
    pub fn coordinates(mut self, coords: Vec<[f64; 2]>) -> Self {
        self.coords = Some(coords);
        self
    }

    /// Register a dataset as one column per site, each spanning the full
    /// time axis.
    pub fn dataset(mut self, name: impl Into<String>, columns: Vec<Float64Array>) -> Self {
        self.datasets.insert(name.into(), columns);
        self
    }

    pub fn build(self) -> Result<MemStore, Error> {
        let meta = self
            .meta
            .ok_or_else(|| Error::Shape("missing site meta table".into()))?;
        let axis = self
            .axis
            .ok_or_else(|| Error::Shape("missing time axis".into()))?;
        let table = SiteTable::new(meta);

        for (name, columns) in &self.datasets {
            if columns.len() != table.len() {
                return Err(Error::Shape(format!(
                    "dataset {name} has {} site columns, expected {}",
                    columns.len(),
                    table.len()
                )));
            }
            if let Some(col) = columns.iter().find(|c| c.len() != axis.len()) {
                return Err(Error::Shape(format!(
                    "dataset {name} column of length {} does not span the {}-step time axis",
                    col.len(),
                    axis.len()
                )));
            }
        }
        if let Some(coords) = &self.coords {
            if coords.len() != table.len() {
                return Err(Error::Shape(format!(
                    "coordinates field has {} entries for {} sites",
                    coords.len(),
                    table.len()
                )));
            }
        }

        Ok(MemStore {
            table,
            axis,
            datasets: self.datasets,
            coords: self.coords,
        })
    }
}
