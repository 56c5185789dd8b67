//! Persisted path-matrix cache.
//!
//! A side-channel optimization: matrices are stored as JSON keyed by map
//! name, together with the exact map text they were computed from. A cache
//! entry whose stored text differs from the current map text is treated as
//! absent, which transparently triggers recomputation. Cache failures never
//! surface as query errors.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GridwayError, Result};

use super::PathData;

/// On-disk cache of computed path matrices.
#[derive(Debug, Clone)]
pub struct PathCache {
    dir: PathBuf,
}

/// Serialized form: infinity is not representable in JSON, so unreachable
/// distances are stored as `None`.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    text: String,
    dist: Vec<Vec<Option<f32>>>,
    pred: Vec<Vec<Option<u32>>>,
}

impl PathCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the cached matrices for a map, if present and computed from
    /// exactly this text. Any mismatch or read failure yields `None`.
    pub fn load(&self, name: &str, text: &str) -> Option<PathData> {
        let raw = fs::read_to_string(self.entry_path(name)).ok()?;
        let file: CacheFile = serde_json::from_str(&raw).ok()?;
        if file.text != text {
            return None;
        }

        // Reject malformed matrices instead of letting them panic later.
        let n = file.dist.len();
        if file.pred.len() != n
            || file.dist.iter().any(|row| row.len() != n)
            || file.pred.iter().any(|row| row.len() != n)
        {
            return None;
        }

        let dist = file
            .dist
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|d| d.unwrap_or(f32::INFINITY))
                    .collect()
            })
            .collect();
        Some(PathData {
            dist,
            pred: file.pred,
        })
    }

    /// Persist the matrices for a map.
    pub fn store(&self, name: &str, text: &str, data: &PathData) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| GridwayError::Io {
            path: self.dir.clone(),
            message: format!("Failed to create cache directory: {}", e),
        })?;

        let file = CacheFile {
            text: text.to_string(),
            dist: data
                .dist
                .iter()
                .map(|row| row.iter().map(|d| d.is_finite().then_some(*d)).collect())
                .collect(),
            pred: data.pred.clone(),
        };

        let path = self.entry_path(name);
        let json = serde_json::to_string(&file).map_err(|e| GridwayError::Build {
            message: format!("Failed to serialize path cache: {}", e),
            help: None,
        })?;
        fs::write(&path, json).map_err(|e| GridwayError::Io {
            path,
            message: format!("Failed to write cache entry: {}", e),
        })?;
        Ok(())
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        let safe: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        self.dir.join(format!("{}.path.json", safe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grid::parse_grid;
    use crate::resolve::resolve_grid;
    use crate::types::Legend;

    fn sample_data(text: &str) -> PathData {
        let mut grid = parse_grid("test", text, &Legend::standard()).unwrap();
        resolve_grid(&mut grid, "test").unwrap();
        PathData::compute(&grid.nodes)
    }

    const MAP: &str = "+ 0 1\n\n0 #-#\n+ 0 1";

    #[test]
    fn test_store_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PathCache::new(dir.path());
        let data = sample_data(MAP);

        cache.store("town", MAP, &data).unwrap();
        let loaded = cache.load("town", MAP).unwrap();

        assert_eq!(loaded.node_count(), data.node_count());
        assert_eq!(loaded.distance(0, 1), data.distance(0, 1));
        assert_eq!(loaded.pred, data.pred);
    }

    #[test]
    fn test_text_mismatch_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PathCache::new(dir.path());
        let data = sample_data(MAP);

        cache.store("town", MAP, &data).unwrap();
        assert!(cache.load("town", "+ 0\n\n0 #\n+ 0").is_none());
    }

    #[test]
    fn test_missing_entry_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PathCache::new(dir.path());
        assert!(cache.load("nowhere", MAP).is_none());
    }

    #[test]
    fn test_corrupt_entry_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PathCache::new(dir.path());

        std::fs::write(dir.path().join("town.path.json"), "not json").unwrap();
        assert!(cache.load("town", MAP).is_none());
    }

    #[test]
    fn test_unreachable_distances_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PathCache::new(dir.path());
        let data = sample_data("+ 0 1 2\n\n0 #-# #\n+ 0 1 2");

        cache.store("gap", "gap-text", &data).unwrap();
        let loaded = cache.load("gap", "gap-text").unwrap();

        assert!(loaded.distance(0, 2).is_none());
        assert!(loaded.distance(0, 1).is_some());
    }
}
