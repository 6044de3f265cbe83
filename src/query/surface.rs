//! Series and map extraction over the bound storage backend

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;

use crate::store::{ResourceStore, SiteSelector, TimeSelector, YearIndexed};

use super::{Collection, QueryError, QueryResult};

fn time_field() -> Field {
    Field::new(
        "time_index",
        DataType::Timestamp(TimeUnit::Nanosecond, None),
        false,
    )
}

impl<S: ResourceStore> Collection<S> {
    /// Full-axis time series of `dataset` for one site:
    /// `[time_index, <dataset>]`.
    pub fn series(&self, dataset: &str, gid: usize) -> QueryResult<RecordBatch> {
        let values = self
            .store()
            .dataset_column(dataset, &TimeSelector::All, gid)?;
        let schema = Arc::new(Schema::new(vec![
            time_field(),
            Field::new(dataset, DataType::Float64, true),
        ]));
        Ok(RecordBatch::try_new(
            schema,
            vec![
                Arc::new(self.time_axis().to_array()?) as ArrayRef,
                Arc::new(values),
            ],
        )?)
    }

    /// Full-axis series for several sites: `[time_index, "<gid>", ...]`,
    /// one column per site in input order.
    pub fn multi_series(&self, dataset: &str, gids: &[usize]) -> QueryResult<RecordBatch> {
        let columns = self.store().dataset_slice(
            dataset,
            &TimeSelector::All,
            &SiteSelector::Many(gids.to_vec()),
        )?;
        let mut fields = vec![time_field()];
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(self.time_axis().to_array()?)];
        for (gid, column) in gids.iter().zip(columns) {
            fields.push(Field::new(gid.to_string(), DataType::Float64, true));
            arrays.push(Arc::new(column));
        }
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    /// [`Collection::series`] for the site nearest to `(lat, lon)`.
    pub fn series_at(&self, dataset: &str, coord: (f64, f64)) -> QueryResult<RecordBatch> {
        let gid = self.nearest_site(coord)?;
        self.series(dataset, gid)
    }

    /// [`Collection::multi_series`] for the sites nearest to each
    /// coordinate pair, columns in input order.
    pub fn multi_series_at(
        &self,
        dataset: &str,
        coords: &[(f64, f64)],
    ) -> QueryResult<RecordBatch> {
        let gids = self.nearest_sites(coords)?;
        self.multi_series(dataset, &gids)
    }

    /// Series table for every site in `region`. An empty region yields a
    /// batch with just the time column.
    pub fn region_series(
        &self,
        dataset: &str,
        region: &str,
        column: &str,
    ) -> QueryResult<RecordBatch> {
        let gids = self.sites_in_region(region, column);
        self.multi_series(dataset, &gids)
    }

    /// Spatial snapshot of `dataset` at `timestamp`:
    /// `[longitude, latitude, <dataset>]`, one row per (optionally
    /// region-filtered) site.
    pub fn snapshot(
        &self,
        dataset: &str,
        timestamp: &str,
        region: Option<&str>,
        column: &str,
    ) -> QueryResult<RecordBatch> {
        let position = self.position_of(timestamp)?;
        let (selector, coords) = self.site_selection(region, column)?;
        let slices = self
            .store()
            .dataset_slice(dataset, &TimeSelector::At(position), &selector)?;
        let values: Float64Array = slices
            .iter()
            .map(|a| if a.is_null(0) { None } else { Some(a.value(0)) })
            .collect();
        map_batch(dataset, &coords, values)
    }

    fn site_selection(
        &self,
        region: Option<&str>,
        column: &str,
    ) -> QueryResult<(SiteSelector, Vec<[f64; 2]>)> {
        let coords = self.lat_lon()?;
        match region {
            None => Ok((SiteSelector::All, coords.to_vec())),
            Some(region) => {
                let gids = self.sites_in_region(region, column);
                let subset = gids.iter().map(|&gid| coords[gid]).collect();
                Ok((SiteSelector::Many(gids), subset))
            }
        }
    }
}

impl<S: ResourceStore + YearIndexed> Collection<S> {
    /// Per-site mean of `dataset` over the selected years, coordinates
    /// attached: `[longitude, latitude, <dataset>]`. Only available on
    /// temporally sharded collections.
    pub fn mean_map(
        &self,
        dataset: &str,
        years: &[i32],
        region: Option<&str>,
        column: &str,
    ) -> QueryResult<RecordBatch> {
        let (selector, coords) = self.site_selection(region, column)?;
        let mut sums = vec![0.0f64; coords.len()];
        let mut counts = vec![0usize; coords.len()];

        for &year in years {
            let span = self
                .store()
                .year_span(year)
                .ok_or(QueryError::YearNotCovered(year))?;
            let slices =
                self.store()
                    .dataset_slice(dataset, &TimeSelector::Span(span), &selector)?;
            for (site, column) in slices.iter().enumerate() {
                for value in column.iter().flatten() {
                    sums[site] += value;
                    counts[site] += 1;
                }
            }
        }

        let values: Float64Array = sums
            .iter()
            .zip(&counts)
            .map(|(&sum, &n)| if n == 0 { None } else { Some(sum / n as f64) })
            .collect();
        map_batch(dataset, &coords, values)
    }
}

fn map_batch(
    dataset: &str,
    coords: &[[f64; 2]],
    values: Float64Array,
) -> QueryResult<RecordBatch> {
    let lon: Float64Array = coords.iter().map(|c| Some(c[1])).collect();
    let lat: Float64Array = coords.iter().map(|c| Some(c[0])).collect();
    let schema = Arc::new(Schema::new(vec![
        Field::new("longitude", DataType::Float64, false),
        Field::new("latitude", DataType::Float64, false),
        Field::new(dataset, DataType::Float64, true),
    ]));
    Ok(RecordBatch::try_new(
        schema,
        vec![Arc::new(lon), Arc::new(lat), Arc::new(values)],
    )?)
}
