//! Site and time locators: user-facing keys to backend-facing keys

use crate::store::{ResourceStore, TimeAxis};

use super::{Collection, QueryError, QueryResult};

impl<S: ResourceStore> Collection<S> {
    /// Gid of the modeled site nearest to `(lat, lon)`.
    pub fn nearest_site(&self, coord: (f64, f64)) -> QueryResult<usize> {
        self.tree()?
            .nearest([coord.0, coord.1])
            .ok_or(QueryError::NoSites)
    }

    /// Nearest gid per coordinate pair, mirroring input order and length.
    pub fn nearest_sites(&self, coords: &[(f64, f64)]) -> QueryResult<Vec<usize>> {
        let tree = self.tree()?;
        coords
            .iter()
            .map(|&(lat, lon)| tree.nearest([lat, lon]).ok_or(QueryError::NoSites))
            .collect()
    }

    /// Gids whose `column` value equals `region`, in ascending table order.
    /// No match or a missing column yields an empty vec, not an error.
    pub fn sites_in_region(&self, region: &str, column: &str) -> Vec<usize> {
        self.site_table().region_gids(region, column)
    }

    /// [`Collection::sites_in_region`] over the default "state" column.
    pub fn sites_in_state(&self, region: &str) -> Vec<usize> {
        self.sites_in_region(region, "state")
    }

    /// Distinct values of `column` ("state", "country", "county", ...);
    /// None when the site table has no such column.
    pub fn available_regions(&self, column: &str) -> Option<Vec<String>> {
        self.site_table().distinct(column)
    }

    /// Exact position of `timestamp` on the time axis. The string must
    /// parse and must match an axis entry; there is no nearest-time snap.
    pub fn position_of(&self, timestamp: &str) -> QueryResult<usize> {
        let ts = TimeAxis::parse(timestamp)
            .ok_or_else(|| QueryError::InvalidTimestamp(timestamp.to_string()))?;
        self.time_axis()
            .position_of(ts)
            .ok_or_else(|| QueryError::TimestampNotFound(timestamp.to_string()))
    }
}
