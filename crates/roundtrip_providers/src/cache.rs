use std::{
    hash::{Hash, Hasher},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use fxhash::FxHasher64;
use serde::{Deserialize, Serialize};

use crate::cost::Cost;

pub const CACHE_FOLDER_ENV_VAR: &str = "ROUNDTRIP_CACHE_FOLDER";

/// A cost matrix as stored on disk, row-major.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CachedMatrix {
    pub num_locations: usize,
    pub costs: Vec<Cost>,
}

/// Identifies a matrix by its ordered points and the provider configuration
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixCacheKey(u64);

fn hash_points<H, P>(points: &[P], hasher: &mut H)
where
    H: Hasher,
    for<'a> &'a P: Into<geo_types::Point>,
{
    points.len().hash(hasher);
    for point in points {
        let point = point.into();
        hasher.write_u64(point.x().to_bits());
        hasher.write_u64(point.y().to_bits());
    }
}

impl MatrixCacheKey {
    pub fn new<P>(points: &[P], provider_fingerprint: u64) -> Self
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        let mut hasher = FxHasher64::default();

        hash_points(points, &mut hasher);
        hasher.write_u64(provider_fingerprint);

        Self(hasher.finish())
    }

    pub fn filename(&self) -> String {
        format!("{:016x}.json", self.0)
    }
}

pub trait MatricesCache: Send + Sync {
    fn cache(&self, key: &MatrixCacheKey, matrix: &CachedMatrix) -> Result<(), anyhow::Error>;

    fn get_cached(&self, key: &MatrixCacheKey) -> Result<Option<CachedMatrix>, anyhow::Error>;
}

/// Never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl MatricesCache for NoCache {
    fn cache(&self, _key: &MatrixCacheKey, _matrix: &CachedMatrix) -> Result<(), anyhow::Error> {
        Ok(())
    }

    fn get_cached(&self, _key: &MatrixCacheKey) -> Result<Option<CachedMatrix>, anyhow::Error> {
        Ok(None)
    }
}

/// `None` behaves like [`NoCache`].
impl<C: MatricesCache> MatricesCache for Option<C> {
    fn cache(&self, key: &MatrixCacheKey, matrix: &CachedMatrix) -> Result<(), anyhow::Error> {
        match self {
            Some(cache) => cache.cache(key, matrix),
            None => Ok(()),
        }
    }

    fn get_cached(&self, key: &MatrixCacheKey) -> Result<Option<CachedMatrix>, anyhow::Error> {
        match self {
            Some(cache) => cache.get_cached(key),
            None => Ok(None),
        }
    }
}

/// Stores one JSON file per matrix in a folder.
#[derive(Debug, Clone)]
pub struct FileCache {
    folder: PathBuf,
}

impl FileCache {
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self, anyhow::Error> {
        let folder = folder.into();

        if !folder.is_dir() {
            return Err(anyhow::anyhow!(format!(
                "Path {} is not a directory",
                folder.display()
            )));
        }

        Ok(Self { folder })
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let cache_folder_path = std::env::var(CACHE_FOLDER_ENV_VAR)?;
        Self::new(cache_folder_path)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl MatricesCache for FileCache {
    fn cache(&self, key: &MatrixCacheKey, matrix: &CachedMatrix) -> Result<(), anyhow::Error> {
        let file = std::fs::File::create(self.folder.join(key.filename()))?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        serde_json::to_writer(&mut writer, matrix)?;
        writer.flush()?;

        Ok(())
    }

    fn get_cached(&self, key: &MatrixCacheKey) -> Result<Option<CachedMatrix>, anyhow::Error> {
        let file_path = self.folder.join(key.filename());

        if !file_path.is_file() {
            return Ok(None);
        }

        let file = std::fs::File::open(file_path)?;
        let matrix: CachedMatrix = serde_json::from_reader(BufReader::new(file))?;

        Ok(Some(matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn points() -> Vec<Location> {
        vec![
            Location::from_lat_lon(50.0, 4.0),
            Location::from_lat_lon(51.0, 4.5),
        ]
    }

    #[test]
    fn test_key_depends_on_order_and_provider() {
        let forward = points();
        let backward: Vec<Location> = forward.iter().rev().copied().collect();

        assert_eq!(
            MatrixCacheKey::new(&forward, 1),
            MatrixCacheKey::new(&points(), 1)
        );
        assert_ne!(
            MatrixCacheKey::new(&forward, 1),
            MatrixCacheKey::new(&backward, 1)
        );
        assert_ne!(
            MatrixCacheKey::new(&forward, 1),
            MatrixCacheKey::new(&forward, 2)
        );
        assert_eq!(MatrixCacheKey::new(&forward, 1).filename().len(), 21);
    }

    #[test]
    fn test_file_cache_roundtrip() {
        let folder = tempfile::tempdir().unwrap();
        let cache = FileCache::new(folder.path()).unwrap();
        let key = MatrixCacheKey::new(&points(), 7);

        assert_eq!(cache.get_cached(&key).unwrap(), None);

        let matrix = CachedMatrix {
            num_locations: 2,
            costs: vec![Cost::ZERO, Cost::Finite(3.5), Cost::Unreachable, Cost::ZERO],
        };
        cache.cache(&key, &matrix).unwrap();

        assert_eq!(cache.get_cached(&key).unwrap(), Some(matrix));
    }

    #[test]
    fn test_optional_cache() {
        let folder = tempfile::tempdir().unwrap();
        let key = MatrixCacheKey::new(&points(), 7);
        let matrix = CachedMatrix {
            num_locations: 1,
            costs: vec![Cost::ZERO],
        };

        let disabled: Option<FileCache> = None;
        disabled.cache(&key, &matrix).unwrap();
        assert_eq!(disabled.get_cached(&key).unwrap(), None);

        let enabled = Some(FileCache::new(folder.path()).unwrap());
        enabled.cache(&key, &matrix).unwrap();
        assert_eq!(enabled.get_cached(&key).unwrap(), Some(matrix));
    }

    #[test]
    fn test_file_cache_requires_directory() {
        let folder = tempfile::tempdir().unwrap();
        let file = folder.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(FileCache::new(&file).is_err());
    }
}
