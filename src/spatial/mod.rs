//! Nearest-site coordinate index and its persistent cache

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

mod cache;

#[cfg(test)]
mod tests;

pub use cache::{IndexCache, cache_file, parse_year};

/// One site position in the index, carrying its table gid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SitePoint {
    pub pos: [f64; 2],
    pub gid: usize,
}

impl RTreeObject for SitePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pos)
    }
}

impl PointDistance for SitePoint {
    /// Planar squared Euclidean distance. Latitude/longitude are treated as
    /// Cartesian coordinates, so distortion grows at high latitudes and
    /// wide longitude spans.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.pos[0] - point[0];
        let dy = self.pos[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Nearest-neighbor index over the (lat, lon) pairs of a site table.
/// Round-trips through [`IndexCache`] for reuse across opens.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinateIndex {
    tree: RTree<SitePoint>,
}

impl CoordinateIndex {
    pub fn build(lat_lon: &[[f64; 2]]) -> Self {
        let points = lat_lon
            .iter()
            .enumerate()
            .map(|(gid, &pos)| SitePoint { pos, gid })
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Gid of the site nearest to `coord`; distance ties go to the lowest
    /// gid, i.e. first occurrence in table order.
    pub fn nearest(&self, coord: [f64; 2]) -> Option<usize> {
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&coord);
        let (first, best) = candidates.next()?;
        let mut gid = first.gid;
        for (point, dist) in candidates {
            if dist > best {
                break;
            }
            gid = gid.min(point.gid);
        }
        Some(gid)
    }

    /// Nearest gid per coordinate, mirroring input order and length.
    pub fn nearest_each(&self, coords: &[[f64; 2]]) -> Vec<Option<usize>> {
        coords.iter().map(|&c| self.nearest(c)).collect()
    }
}
