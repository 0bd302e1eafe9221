//! Persistence of the last successful raw responses.
//!
//! Values are stored verbatim and re-parsed on read. There is one slot per
//! [`CacheCategory`]; writes overwrite, nothing expires.

use directories::ProjectDirs;
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::NamedTempFile;

use crate::error::CacheError;

/// Namespace the keys live under; also the directory name of [`FileStore`].
pub const NAMESPACE: &str = "weather_cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    Current,
    Forecast,
}

impl CacheCategory {
    pub fn key(&self) -> &'static str {
        match self {
            CacheCategory::Current => "current_weather",
            CacheCategory::Forecast => "forecast",
        }
    }
}

/// A string-keyed store scoped to the application.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Must be durable by the time it returns.
    fn put(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One file per key under `<dir>/weather_cache/`. Each write goes to a fresh
/// temp file that is renamed over the slot, so writers never see or depend on
/// each other's partial state.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store under `<dir>/weather_cache/`. The directory is created on first write.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().join(NAMESPACE),
        }
    }

    /// Store in the platform cache directory.
    pub fn default_location() -> anyhow::Result<Self> {
        Ok(Self::in_dir(default_cache_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(path: &Path, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Self::io_error(&path, source)),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|source| Self::io_error(&self.dir, source))?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|source| Self::io_error(&self.dir, source))?;
        tmp.write_all(value.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|source| Self::io_error(tmp.path(), source))?;
        tmp.persist(&path)
            .map_err(|e| Self::io_error(&path, e.error))?;
        Ok(())
    }
}

/// Platform cache directory for the application.
pub fn default_cache_dir() -> anyhow::Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "weatherway", "weather-cli")
        .ok_or_else(|| anyhow::anyhow!("Could not determine platform cache directory"))?;

    Ok(dirs.cache_dir().to_path_buf())
}

/// Typed front for a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct WeatherCache {
    store: Arc<dyn KeyValueStore>,
}

impl WeatherCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, raw), fields(len = raw.len()))]
    pub fn put(&self, category: CacheCategory, raw: &str) -> Result<(), CacheError> {
        self.store.put(category.key(), raw)
    }

    /// `None` when nothing was ever stored for `category`.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub fn get(&self, category: CacheCategory) -> Result<Option<String>, CacheError> {
        let value = self.store.get(category.key())?;
        if value.is_none() {
            tracing::debug!("Key not found");
        }
        Ok(value)
    }
}
