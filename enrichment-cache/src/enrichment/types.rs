//! Timeline records flowing through the enrichment pipeline

use crate::cache::LookupQuery;
use serde::{Deserialize, Serialize};

/// Message recorded on a movie the provider had no match for
pub const NO_METADATA_FOUND: &str = "No metadata found";

/// A film attached to a timeline event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRef {
    pub title: String,
    pub year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
}

impl MovieRef {
    pub fn new(title: impl Into<String>, year: u32) -> Self {
        Self {
            title: title.into(),
            year,
            director: None,
        }
    }

    pub fn with_director(mut self, director: impl Into<String>) -> Self {
        self.director = Some(director.into());
        self
    }

    /// The cache/provider lookup for this film
    pub fn to_query(&self) -> LookupQuery {
        LookupQuery {
            title: self.title.clone(),
            year: Some(self.year),
            attributed_name: self.director.clone(),
        }
    }
}

/// A historical event with its related films, as read from the event store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub movies: Vec<MovieRef>,
}

impl TimelineEvent {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            movies: Vec::new(),
        }
    }

    pub fn with_movie(mut self, movie: MovieRef) -> Self {
        self.movies.push(movie);
        self
    }
}

/// Outcome of enriching one film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMovie<T> {
    pub title: String,
    pub year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> EnrichedMovie<T> {
    pub fn found(movie: &MovieRef, metadata: T) -> Self {
        Self {
            title: movie.title.clone(),
            year: movie.year,
            director: movie.director.clone(),
            metadata: Some(metadata),
            error: None,
        }
    }

    pub fn failed(movie: &MovieRef, error: impl Into<String>) -> Self {
        Self {
            title: movie.title.clone(),
            year: movie.year,
            director: movie.director.clone(),
            metadata: None,
            error: Some(error.into()),
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.metadata.is_some()
    }
}

/// An event plus per-film enrichment results
///
/// `movies` is `None` when the event was passed through without enrichment
/// (no films attached, or the provider was unreachable). On the wire it sits
/// next to the event's own `movies` as `enrichedMovies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTimelineEvent<T> {
    #[serde(flatten)]
    pub event: TimelineEvent,
    #[serde(rename = "enrichedMovies", default, skip_serializing_if = "Option::is_none")]
    pub movies: Option<Vec<EnrichedMovie<T>>>,
}

impl<T> EnrichedTimelineEvent<T> {
    pub fn unenriched(event: TimelineEvent) -> Self {
        Self {
            event,
            movies: None,
        }
    }
}

/// Aggregate outcome of an enrichment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EnrichmentSummary {
    pub total_movies: usize,
    pub enriched_movies: usize,
    pub failed_movies: usize,
    /// Rounded percentage of films enriched (0 when there were none)
    pub success_rate: u32,
}

impl EnrichmentSummary {
    pub fn from_events<T>(events: &[EnrichedTimelineEvent<T>]) -> Self {
        let mut summary = Self::default();

        for movies in events.iter().filter_map(|e| e.movies.as_ref()) {
            summary.total_movies += movies.len();
            summary.enriched_movies += movies.iter().filter(|m| m.is_enriched()).count();
            summary.failed_movies += movies.iter().filter(|m| m.error.is_some()).count();
        }

        summary.success_rate = if summary.total_movies > 0 {
            ((summary.enriched_movies as f64 / summary.total_movies as f64) * 100.0).round() as u32
        } else {
            0
        };

        summary
    }
}
