//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with TTL expiration. The store
//! itself is single-threaded; the `Cache` handle wraps it in a reader/writer
//! lock for concurrent use.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{expiry, CacheEntry, CacheStats, Ttl};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Main cache storage with TTL support.
///
/// Expired entries are removed lazily on read and eagerly by the reaper's
/// periodic [`purge_expired`] sweeps; both paths share one expiration
/// predicate, so they agree at every instant.
///
/// [`purge_expired`]: CacheStore::purge_expired
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Default expiration for entries stored with `Ttl::Default`, None = never
    default_expiration: Option<Duration>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given default expiration.
    pub fn new(default_expiration: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_expiration,
        }
    }

    // == Put ==
    /// Stores a key-value pair with the requested TTL.
    ///
    /// If the key already exists, the entry is replaced wholesale and its
    /// expiration recomputed. `Ttl::Default` falls back to the configured
    /// default expiration; `Ttl::Never` pins the entry regardless of it.
    pub fn put(&mut self, key: String, value: String, ttl: Ttl) {
        let now = Instant::now();
        let expires_at = expiry::expires_at(now, self.default_expiration, ttl);

        self.entries.insert(key, CacheEntry::new(value, expires_at));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` for absent keys and for entries whose TTL has elapsed,
    /// whether or not a sweep has physically removed them yet. Expired
    /// entries found on this path are deleted immediately, bounding memory
    /// growth between sweeps.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = Instant::now();

        match self.entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                self.entries.remove(key);
                self.stats.record_expirations(1);
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_miss();
                None
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key; deleting an absent key is a no-op.
    ///
    /// Returns whether an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Increment ==
    /// Adds `delta` to the integer stored under `key`, in place.
    ///
    /// The entry's expiration is unchanged. Arithmetic wraps on overflow.
    ///
    /// # Returns
    /// - `Ok(Some(new_value))` on success
    /// - `Ok(None)` if the key is absent or expired
    /// - `Err(CacheError::NotNumeric)` if the value is not an integer
    pub fn increment(&mut self, key: &str, delta: i64) -> Result<Option<i64>> {
        let now = Instant::now();

        let Some(entry) = self.entries.get_mut(key) else {
            return Ok(None);
        };
        if expiry::is_expired(now, entry.expires_at) {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            return Ok(None);
        }

        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| CacheError::NotNumeric(key.to_string()))?;
        let updated = current.wrapping_add(delta);
        entry.value = updated.to_string();
        Ok(Some(updated))
    }

    // == Keys ==
    /// Returns a fresh snapshot of all live (non-expired) keys.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Items ==
    /// Returns a fresh snapshot of all live (non-expired) key-value pairs.
    pub fn items(&self) -> Vec<(String, String)> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    // == Flush ==
    /// Removes all entries.
    pub fn flush(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// This is the reaper's sweep. Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
        }

        self.stats.record_expirations(count as u64);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries, expired-but-unswept included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(None);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_put_and_get() {
        let mut store = CacheStore::new(None);

        store.put("key1".to_string(), "value1".to_string(), Ttl::Default);

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new(None);

        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new(None);

        store.put("key1".to_string(), "value1".to_string(), Ttl::Default);

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_is_idempotent() {
        let mut store = CacheStore::new(None);

        store.put("key1".to_string(), "value1".to_string(), Ttl::Default);

        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_overwrite_replaces_wholesale() {
        let mut store = CacheStore::new(None);

        store.put("key1".to_string(), "value1".to_string(), Ttl::After(Duration::from_secs(1)));
        store.put("key1".to_string(), "value2".to_string(), Ttl::Never);

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_expiration_is_lazy() {
        let mut store = CacheStore::new(None);

        store.put("key1".to_string(), "value1".to_string(), Ttl::After(Duration::from_secs(1)));

        assert_eq!(store.get("key1"), Some("value1".to_string()));

        advance(Duration::from_secs(2)).await;

        // Expired: treated as absent and removed on this read
        assert_eq!(store.get("key1"), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_default_expiration_applies() {
        let mut store = CacheStore::new(Some(Duration::from_secs(5)));

        store.put("key1".to_string(), "value1".to_string(), Ttl::Default);

        advance(Duration::from_secs(4)).await;
        assert_eq!(store.get("key1"), Some("value1".to_string()));

        advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("key1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_never_ttl_outlives_default() {
        let mut store = CacheStore::new(Some(Duration::from_secs(1)));

        store.put("pinned".to_string(), "value".to_string(), Ttl::Never);

        advance(Duration::from_secs(3600)).await;
        assert_eq!(store.get("pinned"), Some("value".to_string()));
    }

    #[test]
    fn test_store_increment() {
        let mut store = CacheStore::new(None);

        store.put("counter".to_string(), "10".to_string(), Ttl::Default);

        assert_eq!(store.increment("counter", 5), Ok(Some(15)));
        assert_eq!(store.increment("counter", -3), Ok(Some(12)));
        assert_eq!(store.get("counter"), Some("12".to_string()));
    }

    #[test]
    fn test_store_increment_missing_key() {
        let mut store = CacheStore::new(None);

        assert_eq!(store.increment("counter", 1), Ok(None));
    }

    #[test]
    fn test_store_increment_non_numeric() {
        let mut store = CacheStore::new(None);

        store.put("name".to_string(), "alice".to_string(), Ttl::Default);

        assert_eq!(
            store.increment("name", 1),
            Err(CacheError::NotNumeric("name".to_string()))
        );
        // Value untouched on failure
        assert_eq!(store.get("name"), Some("alice".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_increment_preserves_expiration() {
        let mut store = CacheStore::new(None);

        store.put("counter".to_string(), "1".to_string(), Ttl::After(Duration::from_secs(10)));

        advance(Duration::from_secs(5)).await;
        assert_eq!(store.increment("counter", 1), Ok(Some(2)));

        // The original deadline still stands
        advance(Duration::from_secs(5)).await;
        assert_eq!(store.increment("counter", 1), Ok(None));
        assert_eq!(store.get("counter"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_keys_and_items_skip_expired() {
        let mut store = CacheStore::new(None);

        store.put("short".to_string(), "1".to_string(), Ttl::After(Duration::from_secs(1)));
        store.put("long".to_string(), "2".to_string(), Ttl::After(Duration::from_secs(10)));

        advance(Duration::from_secs(2)).await;

        assert_eq!(store.keys(), vec!["long".to_string()]);
        assert_eq!(store.items(), vec![("long".to_string(), "2".to_string())]);
        // Snapshots do not delete; only reads and sweeps do
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_flush() {
        let mut store = CacheStore::new(None);

        store.put("key1".to_string(), "value1".to_string(), Ttl::Default);
        store.put("key2".to_string(), "value2".to_string(), Ttl::Default);

        store.flush();

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.get("key2"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_purge_expired() {
        let mut store = CacheStore::new(None);

        store.put("key1".to_string(), "value1".to_string(), Ttl::After(Duration::from_secs(1)));
        store.put("key2".to_string(), "value2".to_string(), Ttl::After(Duration::from_secs(10)));
        store.put("key3".to_string(), "value3".to_string(), Ttl::Never);

        advance(Duration::from_secs(2)).await;

        let removed = store.purge_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("key2"), Some("value2".to_string()));
        assert_eq!(store.get("key3"), Some("value3".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_and_get_agree_at_every_instant() {
        let mut store = CacheStore::new(None);

        store.put("key1".to_string(), "value1".to_string(), Ttl::After(Duration::from_secs(3)));

        // Just before the deadline both paths see a live entry
        advance(Duration::from_secs(3) - Duration::from_millis(1)).await;
        assert_eq!(store.purge_expired(), 0);
        assert_eq!(store.get("key1"), Some("value1".to_string()));

        // At the deadline both paths see it expired
        advance(Duration::from_millis(1)).await;
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(None);

        store.put("key1".to_string(), "value1".to_string(), Ttl::Default);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
