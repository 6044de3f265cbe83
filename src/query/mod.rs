//! Collection handles: one query surface over any storage backend

use std::sync::Arc;

use parking_lot::Mutex;

use crate::spatial::{CoordinateIndex, IndexCache, cache_file};
use crate::store::{self, ResourceStore, SiteTable, TimeAxis};

mod locate;
mod surface;

#[cfg(test)]
mod tests;

/// Errors surfaced by collection queries.
#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("Timestamp not on the time axis: {0}")]
    TimestampNotFound(String),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Year {0} not covered by this collection")]
    YearNotCovered(i32),
    #[error("Collection has no sites")]
    NoSites,
    #[error("Storage error: {0}")]
    Store(#[from] store::Error),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Resource domain, selecting the default variable set for site bundles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    Solar,
    Nsrdb,
    Wind,
    Wave,
}

impl Domain {
    /// Default bundle variables for the domain. Wind defaults to the 100 m
    /// hub height; use [`Domain::wind_datasets`] for other heights.
    pub fn bundle_datasets(&self) -> Vec<String> {
        match self {
            Domain::Solar => ["ghi", "dni", "dhi", "air_temperature", "wind_speed"]
                .map(String::from)
                .to_vec(),
            Domain::Nsrdb => [
                "ghi",
                "dni",
                "dhi",
                "air_temperature",
                "wind_speed",
                "surface_pressure",
            ]
            .map(String::from)
            .to_vec(),
            Domain::Wind => Self::wind_datasets(100),
            Domain::Wave => [
                "significant_wave_height",
                "energy_period",
                "mean_wave_direction",
                "water_depth",
            ]
            .map(String::from)
            .to_vec(),
        }
    }

    /// Hub-height-parameterized wind variable set, e.g. `wind_datasets(100)`
    /// for the 100 m level.
    pub fn wind_datasets(hub_height: u32) -> Vec<String> {
        vec![
            format!("windspeed_{hub_height}m"),
            format!("winddirection_{hub_height}m"),
            format!("temperature_{hub_height}m"),
            format!("pressure_{hub_height}m"),
        ]
    }
}

/// Handle over one opened resource collection. Exclusively owns its store,
/// site table, time axis, and coordinate index; all are released together
/// on drop. The index and the coordinate array are computed at most once
/// per handle, so the site table must not change underneath it.
pub struct Collection<S> {
    store: S,
    source: String,
    domain: Domain,
    cache: IndexCache,
    tree: Mutex<Option<Arc<CoordinateIndex>>>,
    coords: Mutex<Option<Arc<Vec<[f64; 2]>>>>,
}

impl<S: ResourceStore> Collection<S> {
    pub fn open(source: impl Into<String>, store: S, domain: Domain, cache: IndexCache) -> Self {
        Self {
            store,
            source: source.into(),
            domain,
            cache,
            tree: Mutex::new(None),
            coords: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn site_table(&self) -> &SiteTable {
        self.store.site_table()
    }

    pub fn time_axis(&self) -> &TimeAxis {
        self.store.time_axis()
    }

    pub fn dataset_names(&self) -> Vec<String> {
        self.store.dataset_names()
    }

    /// (lat, lon) per site: the store's direct coordinates field when
    /// present, else extracted from the site table. Computed once.
    pub fn lat_lon(&self) -> QueryResult<Arc<Vec<[f64; 2]>>> {
        let mut slot = self.coords.lock();
        if let Some(coords) = slot.as_ref() {
            return Ok(Arc::clone(coords));
        }
        let coords = match self.store.coordinates() {
            Some(coords) => coords,
            None => self.site_table().lat_lon()?,
        };
        let coords = Arc::new(coords);
        *slot = Some(Arc::clone(&coords));
        Ok(coords)
    }

    /// The coordinate index, built at most once per collection. A usable
    /// cached index is loaded; on miss, staleness, or a corrupt artifact it
    /// is rebuilt from the site table and written back, so cache loss only
    /// ever costs the rebuild.
    pub fn tree(&self) -> QueryResult<Arc<CoordinateIndex>> {
        let mut slot = self.tree.lock();
        if let Some(tree) = slot.as_ref() {
            return Ok(Arc::clone(tree));
        }

        let key = cache_file(&self.source);
        let mut cached = self.cache.load(&key);
        if let Some(index) = &cached {
            if index.len() != self.site_table().len() {
                log::warn!("cached tree {key} does not match the site table, rebuilding");
                cached = None;
            }
        }
        let index = match cached {
            Some(index) => index,
            None => {
                let coords = self.lat_lon()?;
                let index = CoordinateIndex::build(&coords);
                self.cache.store(&key, &index);
                index
            }
        };

        let index = Arc::new(index);
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }
}

/// Bind a store to the solar variable policy.
pub fn open_solar<S: ResourceStore>(
    source: impl Into<String>,
    store: S,
    cache: IndexCache,
) -> Collection<S> {
    Collection::open(source, store, Domain::Solar, cache)
}

/// Bind a store to the NSRDB variable policy.
pub fn open_nsrdb<S: ResourceStore>(
    source: impl Into<String>,
    store: S,
    cache: IndexCache,
) -> Collection<S> {
    Collection::open(source, store, Domain::Nsrdb, cache)
}

/// Bind a store to the wind variable policy.
pub fn open_wind<S: ResourceStore>(
    source: impl Into<String>,
    store: S,
    cache: IndexCache,
) -> Collection<S> {
    Collection::open(source, store, Domain::Wind, cache)
}

/// Bind a store to the wave variable policy.
pub fn open_wave<S: ResourceStore>(
    source: impl Into<String>,
    store: S,
    cache: IndexCache,
) -> Collection<S> {
    Collection::open(source, store, Domain::Wave, cache)
}
