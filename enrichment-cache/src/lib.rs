//! # Enrichment Cache (enrichment-cache)
//!
//! A local, expiring cache for movie metadata lookups, plus the pipeline that
//! enriches historical timeline events through it.
//!
//! ## Features
//!
//! - Normalized cache keys built from title, release year and director
//! - 24-hour expiration with self-healing removal of stale or corrupt entries
//! - Pluggable storage media (in-memory, single JSON file) with capacity limits
//! - Hit/miss statistics with live entry counts and byte footprint
//! - Failures degrade to cache misses, never to errors
//! - Async, batched enrichment pipeline over any metadata provider
//!
//! ## Caching a Lookup
//!
//! ```
//! use enrichment_cache::{CacheConfig, EnrichmentCache, MemoryStorage};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Rating {
//!     rating: f64,
//! }
//!
//! let cache = EnrichmentCache::new(CacheConfig::default(), Arc::new(MemoryStorage::new()));
//! cache.initialize();
//!
//! cache.set("Dunkirk", &Rating { rating: 7.8 }, Some(2017), Some("Christopher Nolan"));
//!
//! let hit: Option<Rating> = cache.get("Dunkirk", Some(2017), Some("Christopher Nolan"));
//! assert_eq!(hit.map(|r| r.rating), Some(7.8));
//!
//! let stats = cache.stats();
//! assert_eq!((stats.hits, stats.misses, stats.size), (1, 0, 1));
//! ```
//!
//! ## Persisting Across Runs
//!
//! ```no_run
//! use enrichment_cache::{CacheConfig, EnrichmentCache, FileStorage};
//! use std::sync::Arc;
//!
//! fn main() -> enrichment_cache::Result<()> {
//!     let config = CacheConfig::from_env()?;
//!     let storage = FileStorage::open("./data/enrichment-cache.json", config.quota_bytes)?
//!         .with_bytes_per_unit(config.bytes_per_char);
//!
//!     let cache = EnrichmentCache::new(config, Arc::new(storage));
//!     let removed = cache.initialize();
//!     println!("Removed {} expired entries", removed);
//!
//!     let final_stats = cache.dispose();
//!     println!("{}", final_stats);
//!     Ok(())
//! }
//! ```
//!
//! ## Enriching Timeline Events
//!
//! ```no_run
//! use async_trait::async_trait;
//! use enrichment_cache::cache::LookupQuery;
//! use enrichment_cache::enrichment::{
//!     EnrichmentPipeline, EnrichmentSummary, MetadataProvider, MovieRef, TimelineEvent,
//! };
//! use enrichment_cache::{CacheConfig, EnrichmentCache, MemoryStorage};
//! use std::sync::Arc;
//!
//! struct Catalog;
//!
//! #[async_trait]
//! impl MetadataProvider<serde_json::Value> for Catalog {
//!     async fn test_connection(&self) -> bool {
//!         true
//!     }
//!
//!     async fn lookup(&self, query: &LookupQuery) -> enrichment_cache::Result<Option<serde_json::Value>> {
//!         Ok(Some(serde_json::json!({ "title": query.title })))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = Arc::new(EnrichmentCache::new(
//!         CacheConfig::default(),
//!         Arc::new(MemoryStorage::new()),
//!     ));
//!     cache.initialize();
//!
//!     let pipeline = EnrichmentPipeline::new(cache, Arc::new(Catalog));
//!     let events = vec![TimelineEvent::new("evt-1", "Operation Dynamo")
//!         .with_movie(MovieRef::new("Dunkirk", 2017).with_director("Christopher Nolan"))];
//!
//!     let enriched = pipeline.enrich_events(events).await;
//!     let summary = EnrichmentSummary::from_events(&enriched);
//!     println!("{}% of films enriched", summary.success_rate);
//! }
//! ```

pub mod cache;
pub mod clock;
pub mod enrichment;
pub mod error;
pub mod storage;

// Re-export main types for convenience
pub use cache::{
    derive_key, normalize_title, CacheConfig, CacheConfigBuilder, CacheEntry, CacheKey,
    CacheStats, EnrichmentCache, EntryCodec, ExpirationPolicy, LookupQuery, StatsSnapshot,
    StatsTracker, Timestamp,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use enrichment::{
    EnrichedMovie, EnrichedTimelineEvent, EnrichmentPipeline, EnrichmentSummary,
    MetadataProvider, MovieRef, PipelineConfig, TimelineEvent,
};
pub use error::{CacheError, Result};
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
