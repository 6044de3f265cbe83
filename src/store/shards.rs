use std::ops::Range;

use arrow::array::{Array, Float64Array};

use super::{Error, ResourceStore, SiteSelector, SiteTable, TimeAxis, TimeSelector};

/// Extra capability of temporally sharded stores: the stitched time axis
/// decomposes into per-year spans. Gates the multi-year-only operations.
pub trait YearIndexed {
    fn years(&self) -> Vec<i32>;

    /// Row span of `year` on the stitched axis; None when not covered.
    fn year_span(&self, year: i32) -> Option<Range<usize>>;
}

/// Spatially sharded composite: shards cover disjoint site subsets and
/// share one time axis. Site gids are global row positions in the
/// concatenated table.
pub struct SpatialShards<S> {
    shards: Vec<S>,
    offsets: Vec<usize>,
    table: SiteTable,
    axis: TimeAxis,
}

impl<S: ResourceStore> SpatialShards<S> {
    pub fn open(shards: Vec<S>) -> Result<Self, Error> {
        let first = shards
            .first()
            .ok_or_else(|| Error::ShardMismatch("no shards given".into()))?;
        let axis = first.time_axis().clone();
        for (i, shard) in shards.iter().enumerate().skip(1) {
            if shard.time_axis() != &axis {
                return Err(Error::ShardMismatch(format!(
                    "time axis of shard {i} differs from shard 0"
                )));
            }
        }

        let tables: Vec<&SiteTable> = shards.iter().map(|s| s.site_table()).collect();
        let table = SiteTable::concat(&tables)?;

        let mut offsets = Vec::with_capacity(shards.len());
        let mut next = 0;
        for shard in &shards {
            offsets.push(next);
            next += shard.site_table().len();
        }

        Ok(Self {
            shards,
            offsets,
            table,
            axis,
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn locate(&self, gid: usize) -> (usize, usize) {
        let idx = self.offsets.partition_point(|&o| o <= gid) - 1;
        (idx, gid - self.offsets[idx])
    }
}

impl<S: ResourceStore> ResourceStore for SpatialShards<S> {
    fn site_table(&self) -> &SiteTable {
        &self.table
    }

    fn time_axis(&self) -> &TimeAxis {
        &self.axis
    }

    fn dataset_names(&self) -> Vec<String> {
        self.shards[0].dataset_names()
    }

    fn coordinates(&self) -> Option<Vec<[f64; 2]>> {
        let mut all = Vec::with_capacity(self.table.len());
        for shard in &self.shards {
            all.extend(shard.coordinates()?);
        }
        Some(all)
    }

    fn dataset_slice(
        &self,
        name: &str,
        time: &TimeSelector,
        sites: &SiteSelector,
    ) -> Result<Vec<Float64Array>, Error> {
        let gids = sites.resolve(self.table.len())?;
        gids.into_iter()
            .map(|gid| {
                let (idx, local) = self.locate(gid);
                self.shards[idx].dataset_column(name, time, local)
            })
            .collect()
    }
}

/// Temporally sharded composite keyed by year: one shard per year over one
/// site set, time axes stitched in year order. Site tables are validated
/// for identical shape and coordinates at open, so a mismatched shard
/// fails loudly instead of yielding silently wrong per-site values.
pub struct TemporalShards<S> {
    shards: Vec<(i32, S)>,
    spans: Vec<Range<usize>>,
    table: SiteTable,
    axis: TimeAxis,
}

impl<S: ResourceStore> TemporalShards<S> {
    pub fn open(mut shards: Vec<(i32, S)>) -> Result<Self, Error> {
        if shards.is_empty() {
            return Err(Error::ShardMismatch("no shards given".into()));
        }
        shards.sort_by_key(|(year, _)| *year);
        if shards.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(Error::ShardMismatch("duplicate year across shards".into()));
        }

        let table = shards[0].1.site_table().clone();
        let coords = table.lat_lon()?;
        for (year, shard) in &shards[1..] {
            let other = shard.site_table();
            if other.len() != table.len() {
                return Err(Error::ShardMismatch(format!(
                    "{year} shard has {} sites, expected {}",
                    other.len(),
                    table.len()
                )));
            }
            if other.lat_lon()? != coords {
                return Err(Error::ShardMismatch(format!(
                    "{year} shard site coordinates differ from the first shard"
                )));
            }
        }

        let mut timestamps = Vec::new();
        let mut spans = Vec::with_capacity(shards.len());
        for (_, shard) in &shards {
            let start = timestamps.len();
            timestamps.extend_from_slice(shard.time_axis().timestamps());
            spans.push(start..timestamps.len());
        }
        let axis = TimeAxis::new(timestamps)
            .map_err(|_| Error::ShardMismatch("shard time axes overlap or disorder".into()))?;

        Ok(Self {
            shards,
            spans,
            table,
            axis,
        })
    }

    /// Slice a global row range by delegating the overlap to each shard and
    /// stitching per-site columns back together.
    fn stitched(
        &self,
        name: &str,
        want: Range<usize>,
        sites: &SiteSelector,
    ) -> Result<Vec<Float64Array>, Error> {
        let mut parts: Vec<Vec<Float64Array>> = Vec::new();
        for ((_, shard), span) in self.shards.iter().zip(&self.spans) {
            let start = want.start.max(span.start);
            let end = want.end.min(span.end);
            if start >= end {
                continue;
            }
            let local = (start - span.start)..(end - span.start);
            let selector = if local == (0..span.len()) {
                TimeSelector::All
            } else {
                TimeSelector::Span(local)
            };
            parts.push(shard.dataset_slice(name, &selector, sites)?);
        }

        if parts.is_empty() {
            let n = sites.resolve(self.table.len())?.len();
            return Ok(vec![Float64Array::from(Vec::<f64>::new()); n]);
        }

        let n_sites = parts[0].len();
        (0..n_sites)
            .map(|site| concat_f64(parts.iter().map(|shard_cols| &shard_cols[site])))
            .collect()
    }
}

impl<S: ResourceStore> ResourceStore for TemporalShards<S> {
    fn site_table(&self) -> &SiteTable {
        &self.table
    }

    fn time_axis(&self) -> &TimeAxis {
        &self.axis
    }

    fn dataset_names(&self) -> Vec<String> {
        self.shards[0].1.dataset_names()
    }

    fn coordinates(&self) -> Option<Vec<[f64; 2]>> {
        self.shards[0].1.coordinates()
    }

    fn dataset_slice(
        &self,
        name: &str,
        time: &TimeSelector,
        sites: &SiteSelector,
    ) -> Result<Vec<Float64Array>, Error> {
        time.validate(self.axis.len())?;
        match time {
            TimeSelector::At(i) => {
                let idx = self
                    .spans
                    .iter()
                    .position(|span| span.contains(i))
                    .ok_or_else(|| {
                        Error::TimeAxis(format!("time position {i} maps to no shard"))
                    })?;
                let local = TimeSelector::At(i - self.spans[idx].start);
                self.shards[idx].1.dataset_slice(name, &local, sites)
            }
            TimeSelector::All => self.stitched(name, 0..self.axis.len(), sites),
            TimeSelector::Span(r) => self.stitched(name, r.clone(), sites),
        }
    }
}

impl<S: ResourceStore> YearIndexed for TemporalShards<S> {
    fn years(&self) -> Vec<i32> {
        self.shards.iter().map(|(year, _)| *year).collect()
    }

    fn year_span(&self, year: i32) -> Option<Range<usize>> {
        let idx = self.shards.iter().position(|(y, _)| *y == year)?;
        Some(self.spans[idx].clone())
    }
}

fn concat_f64<'a>(parts: impl Iterator<Item = &'a Float64Array>) -> Result<Float64Array, Error> {
    let arrays: Vec<&dyn Array> = parts.map(|a| a as &dyn Array).collect();
    let combined = arrow::compute::concat(&arrays)?;
    combined
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| Error::Shape("concatenated dataset column is not Float64".into()))
}
