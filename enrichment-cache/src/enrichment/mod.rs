//! Enrichment of timeline events with external movie metadata
//!
//! The pipeline asks the cache before every provider lookup and stores what
//! the provider returns. Provider failures are attached to the affected film
//! instead of aborting the run.

pub mod pipeline;
pub mod provider;
pub mod types;

pub use pipeline::{EnrichmentPipeline, PipelineConfig};
pub use provider::MetadataProvider;
pub use types::{
    EnrichedMovie, EnrichedTimelineEvent, EnrichmentSummary, MovieRef, TimelineEvent,
    NO_METADATA_FOUND,
};
