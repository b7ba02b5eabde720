//! Hit/miss accounting

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: u32,
}

/// In-memory hit/miss counters
///
/// Counters only grow until [`StatsTracker::reset`] brings them back to zero.
#[derive(Debug, Default)]
pub struct StatsTracker {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);

        StatsSnapshot {
            hits,
            misses,
            hit_rate: hit_rate(hits, misses),
        }
    }
}

/// Rounded hit percentage, defined as 0 when there were no requests
pub fn hit_rate(hits: u64, misses: u64) -> u32 {
    let total = hits + misses;
    if total == 0 {
        0
    } else {
        ((hits as f64 / total as f64) * 100.0).round() as u32
    }
}
