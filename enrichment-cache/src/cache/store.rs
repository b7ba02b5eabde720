//! Enrichment cache facade
//!
//! Composes key derivation, the entry codec, the expiration policy and a
//! storage backend into the get/set/cleanup/clear/stats contract used by the
//! enrichment pipeline. Every failure is recovered here: callers only ever see
//! a hit or a miss.

use crate::cache::{
    config::CacheConfig,
    entry::EntryCodec,
    expiration::ExpirationPolicy,
    key::{derive_key, LookupQuery},
    stats::StatsTracker,
    types::{CacheKey, CacheStats},
};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::storage::{utf16_len, StorageBackend};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Expiring cache for enrichment lookups, backed by a shared storage medium
///
/// Writes are last-write-wins. Two caches (or two processes) sharing a medium
/// may overwrite each other's entries for the same key; the medium offers no
/// transaction primitive, and a lost cache entry only costs one extra provider
/// lookup.
pub struct EnrichmentCache {
    config: CacheConfig,
    prefix: String,
    policy: ExpirationPolicy,
    storage: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    stats: StatsTracker,
}

impl EnrichmentCache {
    /// Create a cache on `storage` using the system clock
    pub fn new(config: CacheConfig, storage: Arc<dyn StorageBackend>) -> Self {
        Self::with_clock(config, storage, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit time source
    pub fn with_clock(
        config: CacheConfig,
        storage: Arc<dyn StorageBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        debug!("Creating enrichment cache with config: {:?}", config);

        Self {
            prefix: config.key_prefix(),
            policy: ExpirationPolicy::new(config.expiration_window),
            config,
            storage,
            clock,
            stats: StatsTracker::new(),
        }
    }

    /// Startup hook: sweeps expired and corrupt entries left by earlier runs
    pub fn initialize(&self) -> usize {
        info!("Initializing enrichment cache (namespace: {})", self.config.namespace);
        self.cleanup()
    }

    /// Shutdown hook: logs final statistics and returns them
    pub fn dispose(self) -> CacheStats {
        self.log_stats();
        self.stats()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Storage key for a lookup under this cache's namespace
    pub fn key_for(&self, title: &str, year: Option<u32>, attributed_name: Option<&str>) -> CacheKey {
        derive_key(&self.config.namespace, title, year, attributed_name)
    }

    /// Look up a cached payload
    ///
    /// Expired or undecodable entries are removed on the way out so they are
    /// never decoded twice.
    pub fn get<T: DeserializeOwned>(
        &self,
        title: &str,
        year: Option<u32>,
        attributed_name: Option<&str>,
    ) -> Option<T> {
        let key = self.key_for(title, year, attributed_name);

        let raw = match self.storage.read(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache miss: {}", key);
                self.stats.record_miss();
                return None;
            }
            Err(e) => {
                error!("Cache read failed for {}: {}", key, e);
                self.stats.record_miss();
                return None;
            }
        };

        let entry = match EntryCodec::decode::<T>(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                self.remove_quietly(&key);
                self.stats.record_miss();
                return None;
            }
        };

        if !self.policy.is_valid(entry.written_at, self.clock.now_millis()) {
            debug!("Cache entry expired: {}", key);
            self.remove_quietly(&key);
            self.stats.record_miss();
            return None;
        }

        debug!("Cache hit: {}", key);
        self.stats.record_hit();
        Some(entry.payload)
    }

    /// Look up a valid payload without recording statistics or removing anything
    pub fn peek<T: DeserializeOwned>(
        &self,
        title: &str,
        year: Option<u32>,
        attributed_name: Option<&str>,
    ) -> Option<T> {
        let key = self.key_for(title, year, attributed_name);
        let raw = self.storage.read(&key).ok()??;
        let entry = EntryCodec::decode::<T>(&raw).ok()?;

        self.policy
            .is_valid(entry.written_at, self.clock.now_millis())
            .then_some(entry.payload)
    }

    /// Store a payload, replacing any previous entry for the same lookup
    ///
    /// Failures are not reported. A failed write triggers a cleanup pass to
    /// free space and the payload simply stays uncached.
    pub fn set<T: Serialize>(
        &self,
        title: &str,
        payload: &T,
        year: Option<u32>,
        attributed_name: Option<&str>,
    ) {
        let key = self.key_for(title, year, attributed_name);

        if let Err(e) = self.try_set(&key, payload) {
            error!("Cache write failed for {}: {}", key, e);
            self.cleanup();
        }
    }

    /// [`get`](Self::get) keyed by a [`LookupQuery`]
    pub fn get_query<T: DeserializeOwned>(&self, query: &LookupQuery) -> Option<T> {
        self.get(&query.title, query.year, query.attributed_name.as_deref())
    }

    /// [`set`](Self::set) keyed by a [`LookupQuery`]
    pub fn set_query<T: Serialize>(&self, query: &LookupQuery, payload: &T) {
        self.set(
            &query.title,
            payload,
            query.year,
            query.attributed_name.as_deref(),
        )
    }

    /// Remove every expired or unreadable entry in the namespace
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        debug!("Cleaning up enrichment cache");

        let keys = match self.namespace_keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!("Cache cleanup failed to enumerate keys: {}", e);
                return 0;
            }
        };

        let now = self.clock.now_millis();
        let mut stale = Vec::new();

        for key in keys {
            let raw = match self.storage.read(&key) {
                Ok(Some(raw)) => raw,
                // Removed by someone else since enumeration
                Ok(None) => continue,
                Err(e) => {
                    warn!("Cache cleanup could not read {}: {}", key, e);
                    continue;
                }
            };

            let expired = match EntryCodec::decode_envelope(&raw) {
                Ok(written_at) => !self.policy.is_valid(written_at, now),
                Err(_) => true,
            };

            if expired {
                stale.push(key);
            }
        }

        let removed = self.remove_all_quietly(&stale);
        info!("Removed {} expired cache entries", removed);
        removed
    }

    /// Remove every entry in the namespace and reset statistics
    ///
    /// Returns the number of entries removed.
    pub fn clear(&self) -> usize {
        let keys = match self.namespace_keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!("Cache clear failed to enumerate keys: {}", e);
                Vec::new()
            }
        };

        let removed = self.remove_all_quietly(&keys);
        self.stats.reset();

        info!("Cleared {} cache entries", removed);
        removed
    }

    /// Current statistics; `size` is counted live from the backend
    pub fn stats(&self) -> CacheStats {
        let snapshot = self.stats.snapshot();
        let size = match self.storage.count(&self.prefix) {
            Ok(size) => size,
            Err(e) => {
                error!("Error counting cache size: {}", e);
                0
            }
        };

        CacheStats {
            hits: snapshot.hits,
            misses: snapshot.misses,
            size,
            hit_rate: snapshot.hit_rate,
        }
    }

    /// Approximate footprint of the namespace on the medium, in bytes
    pub fn size_in_bytes(&self) -> usize {
        match self.try_size_in_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Error calculating cache size: {}", e);
                0
            }
        }
    }

    /// Log a statistics summary
    pub fn log_stats(&self) {
        let stats = self.stats();
        let size_kb = (self.size_in_bytes() as f64 / 1024.0).round() as u64;

        info!("=== ENRICHMENT CACHE STATS ===");
        info!("Cache hits: {}", stats.hits);
        info!("Cache misses: {}", stats.misses);
        info!("Hit rate: {}%", stats.hit_rate);
        info!("Entries: {}", stats.size);
        info!("Size: {}KB", size_kb);
    }

    /// Keys in this cache's namespace, in backend order
    pub fn namespace_keys(&self) -> Result<Vec<CacheKey>> {
        Ok(self
            .storage
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&self.prefix))
            .collect())
    }

    fn try_set<T: Serialize>(&self, key: &str, payload: &T) -> Result<()> {
        let encoded = EntryCodec::encode(payload, self.clock.now_millis())?;
        self.storage.write(key, &encoded)?;
        debug!("Cached: {}", key);
        Ok(())
    }

    fn try_size_in_bytes(&self) -> Result<usize> {
        let mut units = 0;
        for key in self.namespace_keys()? {
            if let Some(value) = self.storage.read(&key)? {
                units += utf16_len(&key) + utf16_len(&value);
            }
        }
        Ok(units * self.config.bytes_per_char)
    }

    fn remove_all_quietly(&self, keys: &[CacheKey]) -> usize {
        if keys.is_empty() {
            return 0;
        }

        match self.storage.remove_many(keys) {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Failed to remove {} cache entries: {}", keys.len(), e);
                0
            }
        }
    }

    fn remove_quietly(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!("Failed to remove cache entry {}: {}", key, e);
        }
    }
}
