use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::boundaries::{load_boundaries, BoundaryTable};
use super::error::LoadError;
use super::loader::load_emissions;
use super::model::EmissionsTable;

// ---------------------------------------------------------------------------
// Path-keyed memoization
// ---------------------------------------------------------------------------

/// Loaded tables keyed by the canonical form of the path they were read from,
/// so `data/co2.csv` and `./data/../data/co2.csv` share one entry. Paths that
/// cannot be canonicalized (missing files) are keyed as given.
///
/// Entries are only ever added; a restart is the only invalidation. Failed
/// loads are not cached, so a later call retries the file.
#[derive(Debug)]
pub struct PathCache<T> {
    entries: HashMap<PathBuf, Arc<T>>,
}

impl<T> Default for PathCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> PathCache<T> {
    /// Return the cached value for `path`, loading it on first use.
    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> Result<Arc<T>, LoadError>
    where
        F: FnOnce(&Path) -> Result<T, LoadError>,
    {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("cache hit for {}", key.display());
            return Ok(Arc::clone(hit));
        }

        log::info!("cache miss for {}, loading", key.display());
        let value = Arc::new(load(path)?);
        self.entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Caches for both input files of a session.
#[derive(Debug, Default)]
pub struct TableCache {
    emissions: PathCache<EmissionsTable>,
    boundaries: PathCache<BoundaryTable>,
}

impl TableCache {
    pub fn emissions(&mut self, path: &Path) -> Result<Arc<EmissionsTable>, LoadError> {
        self.emissions.get_or_load(path, load_emissions)
    }

    pub fn boundaries(&mut self, path: &Path) -> Result<Arc<BoundaryTable>, LoadError> {
        self.boundaries.get_or_load(path, load_boundaries)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::data::model::EmissionRecord;

    #[test]
    fn second_lookup_reuses_the_loaded_table() {
        let calls = Cell::new(0);
        let mut cache = PathCache::default();
        let load = |_: &Path| {
            calls.set(calls.get() + 1);
            Ok(EmissionsTable::from_records(vec![EmissionRecord::new("A", "AAA", 2000, 1.0)]))
        };

        let first = cache.get_or_load(Path::new("a.csv"), load).unwrap();
        let second = cache.get_or_load(Path::new("a.csv"), load).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);

        cache.get_or_load(Path::new("b.csv"), load).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn equivalent_paths_share_one_entry() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let direct = dir.path().join("co2.csv");
        fs::write(&direct, "Entity,Code,Year,co2\nA,AAA,2000,1\n").unwrap();
        let roundabout = dir.path().join("sub").join("..").join(".").join("co2.csv");

        let calls = Cell::new(0);
        let load = |p: &Path| {
            calls.set(calls.get() + 1);
            load_emissions(p)
        };
        let mut cache = PathCache::default();
        let first = cache.get_or_load(&direct, load).unwrap();
        let second = cache.get_or_load(&roundabout, load).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = TableCache::default();
        let path = Path::new("/no/such/emissions.csv");
        assert!(matches!(cache.emissions(path), Err(LoadError::NotFound(_))));
        assert!(cache.emissions.is_empty());
    }
}
