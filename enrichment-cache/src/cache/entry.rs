//! Cache entry and its on-medium text encoding
//!
//! An entry is persisted as a JSON object with exactly two fields:
//! `data` (the payload) and `timestamp` (write time in epoch milliseconds).
//! There is no schema version; an incompatible payload change needs a new
//! namespace or a tolerant payload type.

use crate::cache::types::Timestamp;
use crate::error::{CacheError, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

/// A cached payload together with the time it was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The enrichment result
    #[serde(rename = "data")]
    pub payload: T,

    /// Write time, set by the cache
    #[serde(rename = "timestamp")]
    pub written_at: Timestamp,
}

impl<T> CacheEntry<T> {
    pub fn new(payload: T, written_at: Timestamp) -> Self {
        Self {
            payload,
            written_at,
        }
    }

    /// Age of the entry at `now`, clamped at zero
    pub fn age_millis(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.written_at).max(0) as u64
    }
}

/// Encodes and decodes entries to and from the storage medium's text format
pub struct EntryCodec;

impl EntryCodec {
    /// Wrap `payload` with its write time and serialize it
    pub fn encode<T: Serialize>(payload: &T, written_at: Timestamp) -> Result<String> {
        let entry = CacheEntry {
            payload,
            written_at,
        };
        serde_json::to_string(&entry).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    /// Parse stored text back into an entry
    pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<CacheEntry<T>> {
        serde_json::from_str(raw).map_err(|e| CacheError::Decode(e.to_string()))
    }

    /// Parse only the write time, skipping over the payload
    ///
    /// Used by maintenance passes that do not know the payload type. The
    /// payload must still be present and well-formed JSON.
    pub fn decode_envelope(raw: &str) -> Result<Timestamp> {
        let entry: CacheEntry<IgnoredAny> =
            serde_json::from_str(raw).map_err(|e| CacheError::Decode(e.to_string()))?;
        Ok(entry.written_at)
    }
}
