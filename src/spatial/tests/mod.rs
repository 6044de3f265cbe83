
pub use super::*;

/// Three sites on a short north-south line, matching the gid order a site
/// table would assign.
pub fn sample_coords() -> Vec<[f64; 2]> {
    vec![[40.0, -105.0], [41.0, -104.0], [40.5, -104.5]]
}
