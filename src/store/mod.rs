//! Site/time data model and storage backends

use std::ops::Range;

use arrow::array::Float64Array;

mod mem;
mod meta;
mod shards;
mod time;

#[cfg(test)]
mod tests;

pub use mem::{MemStore, MemStoreBuilder};
pub use meta::SiteTable;
pub use shards::{SpatialShards, TemporalShards, YearIndexed};
pub use time::TimeAxis;

/// Common error type for storage operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
    #[error("Site gid {gid} out of range for {len} sites")]
    SiteOutOfRange { gid: usize, len: usize },
    #[error("Shard mismatch: {0}")]
    ShardMismatch(String),
    #[error("Meta column error: {0}")]
    MetaColumn(String),
    #[error("Time axis error: {0}")]
    TimeAxis(String),
    #[error("Shape mismatch: {0}")]
    Shape(String),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Selects rows along the time axis of a dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum TimeSelector {
    All,
    At(usize),
    Span(Range<usize>),
}

impl TimeSelector {
    pub fn validate(&self, len: usize) -> Result<(), Error> {
        match self {
            TimeSelector::All => Ok(()),
            TimeSelector::At(i) if *i < len => Ok(()),
            TimeSelector::At(i) => Err(Error::TimeAxis(format!(
                "time position {i} out of range for {len} steps"
            ))),
            TimeSelector::Span(r) if r.start <= r.end && r.end <= len => Ok(()),
            TimeSelector::Span(r) => Err(Error::TimeAxis(format!(
                "time span {}..{} out of range for {len} steps",
                r.start, r.end
            ))),
        }
    }
}

/// Selects sites along the spatial axis of a dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum SiteSelector {
    All,
    One(usize),
    Many(Vec<usize>),
}

impl SiteSelector {
    /// Resolve to concrete gids, validating bounds against the table length.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>, Error> {
        let check = |gid: usize| {
            if gid < len {
                Ok(gid)
            } else {
                Err(Error::SiteOutOfRange { gid, len })
            }
        };
        match self {
            SiteSelector::All => Ok((0..len).collect()),
            SiteSelector::One(gid) => Ok(vec![check(*gid)?]),
            SiteSelector::Many(gids) => gids.iter().map(|&gid| check(gid)).collect(),
        }
    }
}

/// Contract of an opened resource archive: a site table keyed by row
/// position, a time axis, and named datasets sliceable by (time, site).
/// Arrays come back unscaled-ready as one `Float64Array` per selected site.
pub trait ResourceStore {
    fn site_table(&self) -> &SiteTable;

    fn time_axis(&self) -> &TimeAxis;

    fn dataset_names(&self) -> Vec<String>;

    /// Direct (lat, lon) field, when the archive carries one. Callers fall
    /// back to the site table's coordinate columns otherwise.
    fn coordinates(&self) -> Option<Vec<[f64; 2]>> {
        None
    }

    /// Slice `name` along (time, site). One column per selected site, in
    /// selector order.
    fn dataset_slice(
        &self,
        name: &str,
        time: &TimeSelector,
        sites: &SiteSelector,
    ) -> Result<Vec<Float64Array>, Error>;

    /// Single-site convenience over [`ResourceStore::dataset_slice`].
    fn dataset_column(
        &self,
        name: &str,
        time: &TimeSelector,
        gid: usize,
    ) -> Result<Float64Array, Error> {
        let mut columns = self.dataset_slice(name, time, &SiteSelector::One(gid))?;
        columns
            .pop()
            .ok_or_else(|| Error::Shape(format!("store returned no column for gid {gid}")))
    }
}
