//! Cache Handle Module
//!
//! The public, concurrency-safe surface of the cache store. A [`Cache`] is a
//! cheaply cloneable handle over shared state; the reader/writer lock around
//! the entry store serializes mutation, and the reaper (when configured) runs
//! as an owned background task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore, Ttl};
use crate::config::{CacheOption, Config};
use crate::error::{CacheError, Result};
use crate::tasks::Reaper;

// == Shared State ==
#[derive(Debug)]
struct Shared {
    store: Arc<RwLock<CacheStore>>,
    config: Config,
    /// None when `cleanup_interval` is unset; expiration is then lazy-only.
    /// Dropping the last handle drops the reaper, which cancels its task.
    reaper: Option<Reaper>,
}

// == Cache ==
/// An in-memory expiring key-value cache store.
///
/// Every operation takes a [`CancellationToken`]; an operation whose token
/// has already fired returns [`CacheError::Canceled`] without touching state.
/// Operations on the same key observe a total order under the lock;
/// operations on different keys are unordered relative to each other.
///
/// Cloning the handle shares the underlying store. Dropping the last handle
/// signals the reaper; call [`close`] to additionally wait for it to finish.
///
/// [`close`]: Cache::close
#[derive(Debug, Clone)]
pub struct Cache {
    inner: Arc<Shared>,
}

impl Cache {
    // == Constructor ==
    /// Creates a cache from the given options, applied left-to-right.
    ///
    /// Starts the background reaper iff a cleanup interval was configured,
    /// so this must be called from within a tokio runtime in that case.
    ///
    /// # Example
    /// ```no_run
    /// use std::time::Duration;
    /// use cachestore::{with_cleanup_interval, with_default_expiration, Cache};
    ///
    /// # async fn demo() {
    /// let cache = Cache::new([
    ///     with_default_expiration(Duration::from_secs(300)),
    ///     with_cleanup_interval(Duration::from_secs(1)),
    /// ]);
    /// # }
    /// ```
    pub fn new(options: impl IntoIterator<Item = CacheOption>) -> Self {
        let config = Config::from_options(options);
        let store = Arc::new(RwLock::new(CacheStore::new(config.default_expiration)));

        let reaper = config
            .cleanup_interval
            .map(|interval| Reaper::spawn(store.clone(), interval));

        debug!(?config, "cache created");

        Self {
            inner: Arc::new(Shared {
                store,
                config,
                reaper,
            }),
        }
    }

    // == Set ==
    /// Stores a key-value pair with the requested TTL.
    ///
    /// Replaces any existing entry for the key wholesale. Never fails for
    /// well-formed input; the only error is cancellation.
    pub async fn set(
        &self,
        ctx: &CancellationToken,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Ttl,
    ) -> Result<()> {
        check_canceled(ctx)?;
        let mut store = self.inner.store.write().await;
        store.put(key.into(), value.into(), ttl);
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` for keys that are absent or expired; the two are
    /// indistinguishable to the caller.
    pub async fn get(&self, ctx: &CancellationToken, key: &str) -> Result<Option<String>> {
        check_canceled(ctx)?;
        // Write lock: the read path may lazily delete an expired entry
        let mut store = self.inner.store.write().await;
        Ok(store.get(key))
    }

    // == Delete ==
    /// Removes an entry by key. Deleting an absent key is not an error.
    pub async fn delete(&self, ctx: &CancellationToken, key: &str) -> Result<()> {
        check_canceled(ctx)?;
        let mut store = self.inner.store.write().await;
        store.delete(key);
        Ok(())
    }

    // == Increment ==
    /// Atomically adds `delta` to the integer stored under `key`.
    ///
    /// The read-modify-write happens under the write lock, so concurrent
    /// increments never lose updates. The entry's expiration is unchanged.
    ///
    /// # Returns
    /// - `Ok(Some(new_value))` on success
    /// - `Ok(None)` if the key is absent or expired
    /// - `Err(CacheError::NotNumeric)` if the stored value is not an integer
    pub async fn increment(
        &self,
        ctx: &CancellationToken,
        key: &str,
        delta: i64,
    ) -> Result<Option<i64>> {
        check_canceled(ctx)?;
        let mut store = self.inner.store.write().await;
        store.increment(key, delta)
    }

    // == Decrement ==
    /// Atomically subtracts `delta` from the integer stored under `key`.
    ///
    /// Same contract as [`increment`].
    ///
    /// [`increment`]: Cache::increment
    pub async fn decrement(
        &self,
        ctx: &CancellationToken,
        key: &str,
        delta: i64,
    ) -> Result<Option<i64>> {
        check_canceled(ctx)?;
        let mut store = self.inner.store.write().await;
        store.increment(key, delta.wrapping_neg())
    }

    // == Keys ==
    /// Returns a fresh snapshot of all live keys.
    pub async fn keys(&self, ctx: &CancellationToken) -> Result<Vec<String>> {
        check_canceled(ctx)?;
        let store = self.inner.store.read().await;
        Ok(store.keys())
    }

    // == Items ==
    /// Returns a fresh snapshot of all live key-value pairs.
    ///
    /// The snapshot is consistent: it is taken under the lock, so no reader
    /// observes a half-applied mutation.
    pub async fn items(&self, ctx: &CancellationToken) -> Result<Vec<(String, String)>> {
        check_canceled(ctx)?;
        let store = self.inner.store.read().await;
        Ok(store.items())
    }

    // == Flush ==
    /// Removes all entries atomically with respect to concurrent readers.
    pub async fn flush(&self, ctx: &CancellationToken) -> Result<()> {
        check_canceled(ctx)?;
        let mut store = self.inner.store.write().await;
        store.flush();
        Ok(())
    }

    // == Length ==
    /// Returns the current number of entries, expired-but-unswept included.
    pub async fn len(&self) -> usize {
        self.inner.store.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.store.read().await.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.inner.store.read().await.stats()
    }

    // == Config ==
    /// The configuration this cache was constructed with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The configured default expiration, if any.
    pub fn default_expiration(&self) -> Option<Duration> {
        self.inner.config.default_expiration
    }

    // == Close ==
    /// Stops the reaper and waits for its task to finish.
    ///
    /// Idempotent. After this returns, no background activity remains. The
    /// cache itself stays usable; expiration is lazy-only from here on.
    pub async fn close(&self) {
        if let Some(reaper) = &self.inner.reaper {
            reaper.shutdown().await;
        }
    }
}

// == Cancellation Check ==
/// Fails fast if the caller's token fired before the operation started.
fn check_canceled(ctx: &CancellationToken) -> Result<()> {
    if ctx.is_cancelled() {
        return Err(CacheError::Canceled);
    }
    Ok(())
}
