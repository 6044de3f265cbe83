//! resx: site-level query and extraction for time-indexed renewable
//! resource archives.
//!
//! A [`Collection`] binds a storage backend (in-memory, spatially sharded,
//! or temporally sharded) to one query surface: nearest-site lookup over a
//! cached coordinate index, region and timestamp resolution, series and
//! map extraction, and per-site CSV bundle export.

pub mod export;
pub mod query;
pub mod spatial;
pub mod store;

pub use export::{ExportError, SiteBundle, export};
pub use query::{
    Collection, Domain, QueryError, open_nsrdb, open_solar, open_wave, open_wind,
};
pub use spatial::{CoordinateIndex, IndexCache};
pub use store::{
    MemStore, MemStoreBuilder, ResourceStore, SiteTable, SpatialShards, TemporalShards, TimeAxis,
};
