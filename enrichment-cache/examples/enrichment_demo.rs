//! Enrichment Demo Application
//!
//! Runs a small timeline through the enrichment pipeline twice against an
//! in-memory catalog, showing the second pass served from the cache.
//!
//! Usage:
//!   cargo run --example enrichment_demo

use async_trait::async_trait;
use enrichment_cache::{
    CacheConfig, EnrichmentCache, EnrichmentPipeline, EnrichmentSummary, LookupQuery,
    MemoryStorage, MetadataProvider, MovieRef, PipelineConfig, Result, TimelineEvent,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Metadata {
    tmdb_id: u64,
    rating: f64,
}

struct Catalog;

#[async_trait]
impl MetadataProvider<Metadata> for Catalog {
    async fn test_connection(&self) -> bool {
        true
    }

    async fn lookup(&self, query: &LookupQuery) -> Result<Option<Metadata>> {
        info!("Catalog lookup: {}", query);
        let found = match query.title.as_str() {
            "Dunkirk" => Some(Metadata { tmdb_id: 374720, rating: 7.5 }),
            "The Pianist" => Some(Metadata { tmdb_id: 423, rating: 8.4 }),
            _ => None,
        };
        Ok(found)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("=== Enrichment Cache Demo ===");

    let cache = Arc::new(EnrichmentCache::new(
        CacheConfig::default(),
        Arc::new(MemoryStorage::new()),
    ));
    cache.initialize();

    let pipeline = EnrichmentPipeline::with_config(
        cache.clone(),
        Arc::new(Catalog),
        PipelineConfig::default().with_batch_delay(Duration::from_millis(50)),
    );

    let events = vec![
        TimelineEvent::new("evac", "Evacuation of Dunkirk")
            .with_movie(MovieRef::new("Dunkirk", 2017).with_director("Christopher Nolan")),
        TimelineEvent::new("warsaw", "Warsaw Uprising")
            .with_movie(MovieRef::new("The Pianist", 2002))
            .with_movie(MovieRef::new("Unknown Movie", 1999)),
        TimelineEvent::new("armistice", "Armistice"),
    ];

    for pass in 1..=2 {
        info!("\n--- Pass {} ---", pass);
        let enriched = pipeline.enrich_events(events.clone()).await;
        let summary = EnrichmentSummary::from_events(&enriched);
        info!(
            "Enriched {}/{} films ({}%)",
            summary.enriched_movies, summary.total_movies, summary.success_rate
        );
        info!("Cache: {}", cache.stats());
    }

    Ok(())
}
