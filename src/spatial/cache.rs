use std::fs;
use std::path::{Path, PathBuf};

use rand::distr::Alphanumeric;
use rand::{Rng, rng};

use super::CoordinateIndex;

/// On-disk cache of serialized coordinate indexes, one file per key.
///
/// The cache is scratch space: a failure to read or write degrades to a
/// rebuild and is logged, never surfaced to the caller. Concurrent
/// processes share the directory uncoordinated; a torn read of a file
/// being published is just a miss, and rebuilds are idempotent.
pub struct IndexCache {
    dir: PathBuf,
}

impl IndexCache {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Shared scratch directory under the system temp dir.
    pub fn scratch() -> std::io::Result<Self> {
        Self::new(std::env::temp_dir().join("resx-tree-cache"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Load the index cached under `key`. Any failure is a miss.
    pub fn load(&self, key: &str) -> Option<CoordinateIndex> {
        let path = self.path_for(key);
        if !path.exists() {
            return None;
        }
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("could not read cached tree {}: {}", path.display(), e);
                return None;
            }
        };
        match bincode::deserialize(&bytes) {
            Ok(index) => Some(index),
            Err(e) => {
                log::warn!("could not decode cached tree {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Persist `index` under `key`, best effort. Written under a temp name
    /// and renamed so readers never observe a partial file.
    pub fn store(&self, key: &str, index: &CoordinateIndex) {
        let bytes = match bincode::serialize(index) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("could not encode tree for {key}: {e}");
                return;
            }
        };
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.{}.tmp", key, random_suffix(10)));
        let written = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &path));
        if let Err(e) = written {
            log::warn!("could not save tree to {}: {}", path.display(), e);
            let _ = fs::remove_file(&tmp);
        }
    }

    /// Drop the cached index for `key`, if present.
    pub fn invalidate(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

fn random_suffix(len: usize) -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Cache file name for a collection source. A year embedded in the name is
/// stripped, so same-prefix shards of different years share one index file
/// (their site tables are assumed identical); otherwise the extension is
/// replaced.
pub fn cache_file(source: &str) -> String {
    let name = Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());

    match parse_year(&name) {
        Some(year) => {
            let prefix = name.split(&year.to_string()).next().unwrap_or("");
            format!("{prefix}tree.bin")
        }
        None => {
            let stem = name
                .rsplit_once('.')
                .map(|(stem, _)| stem.to_string())
                .unwrap_or(name);
            format!("{stem}_tree.bin")
        }
    }
}

/// First standalone 4-digit run in `name` that parses as a plausible year.
pub fn parse_year(name: &str) -> Option<i32> {
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j - i == 4 {
                if let Ok(year) = name[i..j].parse::<i32>() {
                    if (1800..=2200).contains(&year) {
                        return Some(year);
                    }
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }
    None
}
