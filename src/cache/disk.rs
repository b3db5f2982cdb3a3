//! File-backed mirror of the memory store.
//!
//! One YAML document per key, named `<key>.yml`, inside the configured cache
//! directory. Writes are best-effort: a failure is logged and the in-memory
//! entry stays authoritative. An unreadable record is logged and reported as
//! a miss.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use super::entry::CacheEntry;
use super::key::CacheKey;
use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

const RECORD_EXTENSION: &str = "yml";

#[derive(Debug, Clone)]
pub struct DiskStore {
    dir: PathBuf,
    enabled: bool,
}

impl DiskStore {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            dir: config.cache_path.clone(),
            enabled: config.persist_cache,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `key`.
    pub fn record_path(&self, key: &CacheKey) -> PathBuf {
        self.dir
            .join(format!("{}.{RECORD_EXTENSION}", key.as_str()))
    }

    /// Returns `true` if persistence is on and a record exists for `key`.
    pub fn exists(&self, key: &CacheKey) -> bool {
        self.enabled && self.record_path(key).is_file()
    }

    /// Loads the record for `key`. Missing, unreadable, and corrupt records are misses.
    pub fn load(&self, key: &CacheKey) -> Option<CacheEntry> {
        if !self.enabled {
            return None;
        }
        match self.read_record(key) {
            Ok(entry) => entry,
            Err(e) => {
                error!(key = %key, error = %e, "could not load cache record");
                None
            }
        }
    }

    /// Writes the record for `key`, creating the cache directory if needed.
    ///
    /// Does nothing when persistence is off. Failures are logged, never returned.
    pub fn save(&self, key: &CacheKey, entry: &CacheEntry) {
        if !self.enabled {
            return;
        }
        match self.write_record(key, entry) {
            Ok(path) => debug!(key = %key, path = %path.display(), "cache record written"),
            Err(e) => warn!(key = %key, error = %e, "could not persist cache record"),
        }
    }

    fn read_record(&self, key: &CacheKey) -> CacheResult<Option<CacheEntry>> {
        let path = self.record_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        serde_yaml::from_str(&raw)
            .map(Some)
            .map_err(CacheError::Serialize)
    }

    fn write_record(&self, key: &CacheKey, entry: &CacheEntry) -> CacheResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let doc = serde_yaml::to_string(entry).map_err(CacheError::Serialize)?;
        let path = self.record_path(key);
        fs::write(&path, doc).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
