//! Expiration policy

use crate::cache::types::Timestamp;
use std::time::Duration;

/// Decides whether a stored entry is still fresh enough to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    window: Duration,
}

impl ExpirationPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True iff the entry's age at `now` is strictly below the window
    ///
    /// An entry stamped in the future (clock moved backwards, or written by a
    /// context whose clock runs ahead) has its age clamped to zero and counts
    /// as valid. This leniency is intentional: a skewed clock must not turn
    /// every fresh entry into a miss.
    pub fn is_valid(&self, written_at: Timestamp, now: Timestamp) -> bool {
        let age = now.saturating_sub(written_at).max(0) as u128;
        age < self.window.as_millis()
    }
}
