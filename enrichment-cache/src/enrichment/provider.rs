//! Metadata provider seam

use crate::cache::LookupQuery;
use crate::error::Result;
use async_trait::async_trait;

/// External source of enrichment payloads
///
/// Implementations own their transport, authentication and rate limiting; the
/// pipeline only asks whether the provider is reachable and looks up queries.
#[async_trait]
pub trait MetadataProvider<T: Send + 'static>: Send + Sync {
    /// Check that the provider is reachable before a bulk run
    async fn test_connection(&self) -> bool;

    /// Find the best match for `query`, or `None` when nothing matches
    async fn lookup(&self, query: &LookupQuery) -> Result<Option<T>>;
}
