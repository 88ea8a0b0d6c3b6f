//! cachestore - An in-memory expiring key-value cache store
//!
//! Entries carry an absolute expiry computed from a configured default or a
//! per-entry TTL. Expired entries are hidden (and removed) lazily on read,
//! and a background reaper sweeps them eagerly when a cleanup interval is
//! configured. Every operation accepts a cancellation token and fails fast
//! once it fires.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, Ttl};
pub use config::{with_cleanup_interval, with_default_expiration, with_nope, CacheOption, Config};
pub use error::{CacheError, Result};
