//! On-disk storage medium
//!
//! The whole key space is one JSON object in a single file. It is loaded when
//! the store is opened and rewritten on every mutation, first to a sibling
//! temporary file and then renamed over the original, so a crash mid-write
//! leaves the previous contents intact.
//!
//! Each commit rewrites the full file, so bulk deletions go through
//! [`StorageBackend::remove_many`], which commits once.

use crate::error::{CacheError, Result};
use crate::storage::{QuotaMap, StorageBackend};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// File-backed key/value store with an optional byte quota
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<QuotaMap>,
}

impl FileStorage {
    /// Open the store at `path`, creating it lazily on first write
    pub fn open(path: impl Into<PathBuf>, quota_bytes: Option<usize>) -> Result<Self> {
        let path = path.into();

        let entries: BTreeMap<String, String> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    CacheError::Storage(format!("corrupt store file {:?}: {}", path, e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!("Opened file storage at {:?} ({} keys)", path, entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(QuotaMap::from_entries(entries, quota_bytes)),
        })
    }

    /// Measure the quota with `bytes_per_unit` bytes per UTF-16 code unit
    pub fn with_bytes_per_unit(self, bytes_per_unit: usize) -> Self {
        let mut entries = self.entries.into_inner().unwrap_or_else(|e| e.into_inner());
        entries.set_bytes_per_unit(bytes_per_unit);
        Self {
            path: self.path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently used across all keys
    pub fn used_bytes(&self) -> Result<usize> {
        Ok(self.lock()?.used_bytes())
    }

    fn lock(&self) -> Result<MutexGuard<'_, QuotaMap>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Storage("file storage lock poisoned".to_string()))
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string(entries)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;
        entries.check(key, value)?;

        let previous = entries.insert(key, value);
        if let Err(e) = self.persist(entries.entries()) {
            entries.restore(key, previous);
            return Err(e);
        }

        debug!("file storage: wrote {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.remove_many(&[key.to_string()]).map(|_| ())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys())
    }

    fn remove_many(&self, keys: &[String]) -> Result<usize> {
        let mut entries = self.lock()?;

        let removed: Vec<(&String, String)> = keys
            .iter()
            .filter_map(|key| entries.remove(key).map(|old| (key, old)))
            .collect();
        if removed.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.persist(entries.entries()) {
            for (key, old) in removed {
                entries.restore(key, Some(old));
            }
            return Err(e);
        }

        debug!("file storage: removed {} keys", removed.len());
        Ok(removed.len())
    }
}
