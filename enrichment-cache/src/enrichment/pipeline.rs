//! Cache-first enrichment of timeline events

use crate::cache::EnrichmentCache;
use crate::enrichment::provider::MetadataProvider;
use crate::enrichment::types::{
    EnrichedMovie, EnrichedTimelineEvent, MovieRef, TimelineEvent, NO_METADATA_FOUND,
};
use crate::error::Result;
use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Batching behaviour of a bulk enrichment run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Events enriched concurrently per batch
    pub batch_size: usize,

    /// Pause between batches to stay under provider rate limits
    pub batch_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_delay: Duration::from_millis(500),
        }
    }
}

impl PipelineConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }
}

/// Enriches timeline events with provider metadata, consulting the cache first
pub struct EnrichmentPipeline<T, P> {
    cache: Arc<EnrichmentCache>,
    provider: Arc<P>,
    config: PipelineConfig,
    _payload: PhantomData<fn() -> T>,
}

impl<T, P> EnrichmentPipeline<T, P>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: MetadataProvider<T>,
{
    pub fn new(cache: Arc<EnrichmentCache>, provider: Arc<P>) -> Self {
        Self::with_config(cache, provider, PipelineConfig::default())
    }

    pub fn with_config(cache: Arc<EnrichmentCache>, provider: Arc<P>, config: PipelineConfig) -> Self {
        Self {
            cache,
            provider,
            config,
            _payload: PhantomData,
        }
    }

    pub fn cache(&self) -> &Arc<EnrichmentCache> {
        &self.cache
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Metadata for one film: from the cache when fresh, otherwise from the provider
    pub async fn enrich_movie(&self, movie: &MovieRef) -> Result<Option<T>> {
        let query = movie.to_query();

        if let Some(cached) = self.cache.get_query::<T>(&query) {
            return Ok(Some(cached));
        }

        debug!("Fetching metadata for: {}", query);
        let found = self.provider.lookup(&query).await?;

        match &found {
            Some(payload) => self.cache.set_query(&query, payload),
            None => warn!("No metadata match for: {}", query),
        }

        Ok(found)
    }

    /// Enrich every film of one event concurrently
    pub async fn enrich_event(&self, event: TimelineEvent) -> EnrichedTimelineEvent<T> {
        if event.movies.is_empty() {
            return EnrichedTimelineEvent::unenriched(event);
        }

        debug!(
            "Enriching event \"{}\" with {} movies",
            event.title,
            event.movies.len()
        );

        let movies = join_all(event.movies.iter().map(|movie| async move {
            match self.enrich_movie(movie).await {
                Ok(Some(metadata)) => EnrichedMovie::found(movie, metadata),
                Ok(None) => EnrichedMovie::failed(movie, NO_METADATA_FOUND),
                Err(e) => {
                    error!("Error enriching {}: {}", movie.title, e);
                    EnrichedMovie::failed(movie, e.to_string())
                }
            }
        }))
        .await;

        EnrichedTimelineEvent {
            event,
            movies: Some(movies),
        }
    }

    /// Enrich a list of events in rate-limited batches
    ///
    /// When the provider is unreachable the events come back unenriched.
    pub async fn enrich_events(&self, events: Vec<TimelineEvent>) -> Vec<EnrichedTimelineEvent<T>> {
        info!("Starting enrichment for {} events", events.len());

        if !self.provider.test_connection().await {
            error!("Metadata provider not available, returning events without enrichment");
            return events.into_iter().map(EnrichedTimelineEvent::unenriched).collect();
        }

        let batch_size = self.config.batch_size.max(1);
        let batch_count = events.len().div_ceil(batch_size);
        let mut enriched = Vec::with_capacity(events.len());

        for (index, batch) in events.chunks(batch_size).enumerate() {
            debug!("Processing batch {}/{}", index + 1, batch_count);

            let results = join_all(batch.iter().cloned().map(|event| self.enrich_event(event))).await;
            enriched.extend(results);

            if index + 1 < batch_count && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        info!("Enrichment completed");
        self.cache.log_stats();

        enriched
    }
}
