//! Error types for the enrichment cache
//!
//! Every failure the cache can run into is described here. The cache facade
//! recovers from all of them locally; the variants exist so that backends,
//! configuration loading and the enrichment pipeline can report what went wrong.

use thiserror::Error;

/// Main error type for cache, storage and enrichment operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Stored text is not a well-formed cache entry
    #[error("Decode error: {0}")]
    Decode(String),

    /// Payload could not be serialized for storage
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The storage medium refused a write because it is full
    #[error("Storage quota exceeded: write of {requested} bytes would exceed {quota} byte limit")]
    QuotaExceeded { requested: usize, quota: usize },

    /// Backend-specific storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem error from an on-disk backend
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metadata provider failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<String> for CacheError {
    fn from(s: String) -> Self {
        CacheError::Other(s)
    }
}

impl From<&str> for CacheError {
    fn from(s: &str) -> Self {
        CacheError::Other(s.to_string())
    }
}
