//! # Enrichment Cache
//!
//! A local, expiring cache that sits in front of an external metadata lookup.
//! Entries live on a persistent key/value medium shared with unrelated data,
//! so every key carries a namespace prefix.
//!
//! ## Features
//!
//! - **Normalized keys**: title case, punctuation and spacing do not split entries
//! - **Fixed expiration window**: 24 hours unless configured otherwise at construction
//! - **Self-healing reads**: expired or corrupt entries are removed when read
//! - **Graceful degradation**: storage failures look like misses, never errors
//! - **Live statistics**: hit/miss counters plus on-demand entry count and footprint
//!
//! ## Example
//!
//! ```rust
//! use enrichment_cache::cache::{CacheConfig, EnrichmentCache};
//! use enrichment_cache::storage::MemoryStorage;
//! use std::sync::Arc;
//!
//! let cache = EnrichmentCache::new(CacheConfig::default(), Arc::new(MemoryStorage::new()));
//! cache.initialize();
//!
//! cache.set("Dunkirk", &serde_json::json!({ "rating": 7.8 }), Some(2017), Some("Christopher Nolan"));
//!
//! let hit: Option<serde_json::Value> = cache.get("Dunkirk", Some(2017), Some("Christopher Nolan"));
//! assert!(hit.is_some());
//! assert_eq!(cache.stats().hits, 1);
//! ```

pub mod config;
pub mod entry;
pub mod expiration;
pub mod key;
pub mod stats;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::{CacheEntry, EntryCodec};
pub use expiration::ExpirationPolicy;
pub use key::{derive_key, normalize_title, LookupQuery};
pub use stats::{StatsSnapshot, StatsTracker};
pub use store::EnrichmentCache;
pub use types::{CacheKey, CacheStats, Timestamp};
