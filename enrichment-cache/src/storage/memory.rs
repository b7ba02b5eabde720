//! In-process storage medium

use crate::error::{CacheError, Result};
use crate::storage::{QuotaMap, StorageBackend};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Ordered in-memory key/value store with an optional byte quota
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<QuotaMap>,
}

impl MemoryStorage {
    /// Unlimited store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once `quota_bytes` would be exceeded
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(QuotaMap::new(Some(quota_bytes))),
        }
    }

    /// Measure the quota with `bytes_per_unit` bytes per UTF-16 code unit
    pub fn with_bytes_per_unit(self, bytes_per_unit: usize) -> Self {
        let mut entries = self.entries.into_inner().unwrap_or_else(|e| e.into_inner());
        entries.set_bytes_per_unit(bytes_per_unit);
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Bytes currently used across all keys
    pub fn used_bytes(&self) -> Result<usize> {
        Ok(self.lock()?.used_bytes())
    }

    fn lock(&self) -> Result<MutexGuard<'_, QuotaMap>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;
        entries.check(key, value)?;
        entries.insert(key, value);
        debug!("memory storage: wrote {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys())
    }

    fn remove_many(&self, keys: &[String]) -> Result<usize> {
        let mut entries = self.lock()?;
        Ok(keys.iter().filter(|key| entries.remove(key).is_some()).count())
    }
}
