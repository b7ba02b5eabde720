//! Core type definitions for the cache system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage key for one cached lookup
pub type CacheKey = String;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Cache statistics as reported to diagnostic tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Cache hits since the last clear
    pub hits: u64,

    /// Cache misses since the last clear
    pub misses: u64,

    /// Entries currently stored under the cache namespace
    pub size: usize,

    /// Rounded hit percentage (0 when nothing has been requested)
    pub hit_rate: u32,
}

impl CacheStats {
    /// Total number of lookups recorded
    pub fn requests(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {}%, size: {} }}",
            self.hits, self.misses, self.hit_rate, self.size
        )
    }
}
