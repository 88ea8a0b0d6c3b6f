//! Cache Module
//!
//! Provides in-memory key-value storage with TTL expiration.

mod entry;
mod expiry;
mod handle;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use expiry::Ttl;
pub use handle::Cache;
pub use stats::CacheStats;
pub use store::CacheStore;
