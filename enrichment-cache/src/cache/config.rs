//! Configuration for the enrichment cache

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default namespace tag prefixed to every cache key
pub const DEFAULT_NAMESPACE: &str = "tmdb_cache";

/// Default expiration window: 24 hours
pub const DEFAULT_EXPIRATION_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Browser-style storage keeps strings as UTF-16, two bytes per code unit
pub const DEFAULT_BYTES_PER_CHAR: usize = 2;

/// Typical per-origin browser storage allowance
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

const ENV_NAMESPACE: &str = "ENRICHMENT_CACHE_NAMESPACE";
const ENV_TTL_SECS: &str = "ENRICHMENT_CACHE_TTL_SECS";
const ENV_QUOTA_BYTES: &str = "ENRICHMENT_CACHE_QUOTA_BYTES";
const ENV_PATH: &str = "ENRICHMENT_CACHE_PATH";

/// Configuration for the enrichment cache
///
/// The expiration window is fixed for the lifetime of a cache instance; it is
/// chosen at construction time and never per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Namespace tag distinguishing this cache's keys from other data on the medium
    ///
    /// Caches sharing a medium must not use overlapping namespaces (see
    /// [`CacheConfig::overlaps`]): with `tmdb` and `tmdb_cache` side by side,
    /// the `tmdb` cache counts, sweeps and clears the other cache's entries.
    pub namespace: String,

    /// How long an entry stays valid after it was written
    pub expiration_window: Duration,

    /// Bytes per character used when approximating the medium's footprint
    ///
    /// Backends measure their quota with the same factor when built with
    /// `with_bytes_per_unit(config.bytes_per_char)`.
    pub bytes_per_char: usize,

    /// Capacity of the storage medium in bytes (`None` means unlimited)
    pub quota_bytes: Option<usize>,

    /// Location of the on-disk store, when a file backend is used
    pub store_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            expiration_window: DEFAULT_EXPIRATION_WINDOW,
            bytes_per_char: DEFAULT_BYTES_PER_CHAR,
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
            store_path: None,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Load configuration from the environment, reading a `.env` file first if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut builder = Self::builder();

        if let Ok(namespace) = std::env::var(ENV_NAMESPACE) {
            builder = builder.namespace(namespace);
        }

        if let Ok(raw) = std::env::var(ENV_TTL_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CacheError::Config(format!("{} must be an integer, got {:?}", ENV_TTL_SECS, raw))
            })?;
            builder = builder.expiration_window(Duration::from_secs(secs));
        }

        if let Ok(raw) = std::env::var(ENV_QUOTA_BYTES) {
            let bytes: usize = raw.trim().parse().map_err(|_| {
                CacheError::Config(format!(
                    "{} must be an integer, got {:?}",
                    ENV_QUOTA_BYTES, raw
                ))
            })?;
            // 0 disables the limit
            builder = builder.quota_bytes((bytes > 0).then_some(bytes));
        }

        if let Ok(path) = std::env::var(ENV_PATH) {
            builder = builder.store_path(PathBuf::from(path));
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(CacheError::Config("namespace must not be empty".to_string()));
        }

        if self.expiration_window.is_zero() {
            return Err(CacheError::Config(
                "expiration_window must be greater than 0".to_string(),
            ));
        }

        if self.bytes_per_char == 0 {
            return Err(CacheError::Config(
                "bytes_per_char must be greater than 0".to_string(),
            ));
        }

        if self.quota_bytes == Some(0) {
            return Err(CacheError::Config(
                "quota_bytes must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Key prefix shared by every entry of this cache
    pub fn key_prefix(&self) -> String {
        format!("{}_", self.namespace)
    }

    /// Whether this cache and `other` would claim each other's keys on a shared medium
    ///
    /// Normalized titles may contain `_`, so a key cannot be traced back to
    /// its namespace once one key prefix starts with the other. Identical
    /// namespaces overlap: they address the same entries.
    pub fn overlaps(&self, other: &CacheConfig) -> bool {
        let (ours, theirs) = (self.key_prefix(), other.key_prefix());
        ours.starts_with(&theirs) || theirs.starts_with(&ours)
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    namespace: Option<String>,
    expiration_window: Option<Duration>,
    bytes_per_char: Option<usize>,
    quota_bytes: Option<Option<usize>>,
    store_path: Option<PathBuf>,
}

impl CacheConfigBuilder {
    /// Set the key namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the expiration window
    pub fn expiration_window(mut self, window: Duration) -> Self {
        self.expiration_window = Some(window);
        self
    }

    /// Set the per-character byte factor
    pub fn bytes_per_char(mut self, bytes: usize) -> Self {
        self.bytes_per_char = Some(bytes);
        self
    }

    /// Set the storage quota (`None` for unlimited)
    pub fn quota_bytes(mut self, quota: Option<usize>) -> Self {
        self.quota_bytes = Some(quota);
        self
    }

    /// Set the on-disk store location
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            namespace: self.namespace.unwrap_or(defaults.namespace),
            expiration_window: self.expiration_window.unwrap_or(defaults.expiration_window),
            bytes_per_char: self.bytes_per_char.unwrap_or(defaults.bytes_per_char),
            quota_bytes: self.quota_bytes.unwrap_or(defaults.quota_bytes),
            store_path: self.store_path.or(defaults.store_path),
        }
    }
}
