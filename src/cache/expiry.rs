//! Expiration Policy Module
//!
//! Pure functions deciding when an entry expires and whether it has expired.
//! Both the lazy path (reads) and the eager path (reaper sweeps) go through
//! this module against the same monotonic clock, so the two can never
//! disagree about an entry's liveness at any instant.

use std::time::Duration;

use tokio::time::Instant;

// == TTL Request ==
/// Per-entry time-to-live request passed to `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Use the cache's configured default expiration.
    Default,
    /// Never expire, regardless of the configured default.
    Never,
    /// Expire this long after the entry is stored.
    After(Duration),
}

// == Absolute Expiry ==
/// Computes the absolute expiry instant to store for an entry.
///
/// # Arguments
/// * `now` - The current instant
/// * `default_expiration` - The cache's configured default (`None` = never)
/// * `ttl` - The caller's per-entry TTL request
///
/// # Returns
/// `None` when the entry should never expire.
pub fn expires_at(now: Instant, default_expiration: Option<Duration>, ttl: Ttl) -> Option<Instant> {
    match ttl {
        Ttl::Default => default_expiration.map(|d| now + d),
        Ttl::Never => None,
        Ttl::After(d) => Some(now + d),
    }
}

// == Expiration Predicate ==
/// Returns true once `now` has reached the expiry instant.
///
/// Boundary condition: an entry is expired when `now >= expires_at`, so an
/// entry is gone the moment its TTL has fully elapsed. Entries without an
/// expiry instant never expire.
pub fn is_expired(now: Instant, expires_at: Option<Instant>) -> bool {
    match expires_at {
        Some(expires) => now >= expires,
        None => false,
    }
}
