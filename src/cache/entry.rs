//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

use crate::cache::expiry;

// == Cache Entry ==
/// Represents a single cache entry with value and expiration metadata.
///
/// Entries are owned exclusively by the store; callers only ever see cloned
/// values, never the entry itself.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Absolute expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with a precomputed expiry instant.
    pub fn new(value: String, expires_at: Option<Instant>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Delegates to the expiration policy so that reads and reaper sweeps
    /// apply the exact same predicate.
    pub fn is_expired(&self, now: Instant) -> bool {
        expiry::is_expired(now, self.expires_at)
    }

    // == Time To Live ==
    /// Returns remaining TTL as of `now`, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has an expiry and hasn't reached it
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(now))
    }
}
