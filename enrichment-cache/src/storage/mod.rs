//! Persistent key/value media the cache can sit on
//!
//! A backend is a plain string-to-string store with a capacity limit. It keeps
//! no cache state of its own: keys from every namespace live side by side, and
//! any number of cache instances may share one backend.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::{CacheError, Result};
use std::collections::BTreeMap;

/// Default size of one UTF-16 code unit on the medium
pub const MEDIUM_BYTES_PER_UNIT: usize = 2;

/// Key-addressed string storage with enumerable keys
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// Fails instead of truncating when the medium is full.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently stored, in a stable order for the duration of the call
    fn keys(&self) -> Result<Vec<String>>;

    /// Number of keys starting with `prefix`
    fn count(&self, prefix: &str) -> Result<usize> {
        Ok(self.keys()?.iter().filter(|k| k.starts_with(prefix)).count())
    }

    /// Remove several keys at once, returning how many were present
    ///
    /// Backends with an expensive commit override this to commit once.
    fn remove_many(&self, keys: &[String]) -> Result<usize> {
        let mut removed = 0;
        for key in keys {
            if self.read(key)?.is_some() {
                self.remove(key)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Length of a string in UTF-16 code units
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Bytes one key/value pair occupies on a medium with `bytes_per_unit`
pub(crate) fn entry_footprint(key: &str, value: &str, bytes_per_unit: usize) -> usize {
    (utf16_len(key) + utf16_len(value)) * bytes_per_unit
}

/// Ordered key/value map that keeps a running footprint against an optional quota
#[derive(Debug, Clone)]
pub(crate) struct QuotaMap {
    entries: BTreeMap<String, String>,
    used: usize,
    quota: Option<usize>,
    bytes_per_unit: usize,
}

impl Default for QuotaMap {
    fn default() -> Self {
        Self::new(None)
    }
}

impl QuotaMap {
    pub(crate) fn new(quota: Option<usize>) -> Self {
        Self::from_entries(BTreeMap::new(), quota)
    }

    pub(crate) fn from_entries(entries: BTreeMap<String, String>, quota: Option<usize>) -> Self {
        let mut map = Self {
            entries,
            used: 0,
            quota,
            bytes_per_unit: MEDIUM_BYTES_PER_UNIT,
        };
        map.recount();
        map
    }

    pub(crate) fn set_bytes_per_unit(&mut self, bytes_per_unit: usize) {
        self.bytes_per_unit = bytes_per_unit;
        self.recount();
    }

    pub(crate) fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub(crate) fn get(&self, key: &str) -> Option<&String> {
        self.entries.get(key)
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn used_bytes(&self) -> usize {
        self.used
    }

    /// Reject a write that would push the map past its quota
    pub(crate) fn check(&self, key: &str, value: &str) -> Result<()> {
        let Some(quota) = self.quota else {
            return Ok(());
        };

        let replaced = self
            .entries
            .get(key)
            .map(|old| entry_footprint(key, old, self.bytes_per_unit))
            .unwrap_or(0);
        let requested = entry_footprint(key, value, self.bytes_per_unit);

        if self.used - replaced + requested > quota {
            return Err(CacheError::QuotaExceeded { requested, quota });
        }

        Ok(())
    }

    /// Insert without a quota check, returning the replaced value
    pub(crate) fn insert(&mut self, key: &str, value: &str) -> Option<String> {
        self.used += entry_footprint(key, value, self.bytes_per_unit);
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Some(old) = &previous {
            self.used -= entry_footprint(key, old, self.bytes_per_unit);
        }
        previous
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<String> {
        let previous = self.entries.remove(key);
        if let Some(old) = &previous {
            self.used -= entry_footprint(key, old, self.bytes_per_unit);
        }
        previous
    }

    /// Put `key` back to `previous`, undoing an insert or remove
    pub(crate) fn restore(&mut self, key: &str, previous: Option<String>) {
        match previous {
            Some(old) => {
                self.insert(key, &old);
            }
            None => {
                self.remove(key);
            }
        }
    }

    fn recount(&mut self) {
        self.used = self
            .entries
            .iter()
            .map(|(k, v)| entry_footprint(k, v, self.bytes_per_unit))
            .sum();
    }
}
