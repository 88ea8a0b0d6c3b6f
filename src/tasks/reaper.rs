//! TTL Reaper Task
//!
//! Background task that periodically removes expired cache entries.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cache::CacheStore;

// == Reaper ==
/// Handle to the background sweep task.
///
/// The task loops on a periodic timer; each tick acquires the write lock,
/// purges expired entries, and releases. Cancellation is observed at the tick
/// boundary. [`stop`] only signals and may be called any number of times from
/// any task; [`shutdown`] additionally waits for the task to finish, so no
/// background activity survives it.
///
/// [`stop`]: Reaper::stop
/// [`shutdown`]: Reaper::shutdown
#[derive(Debug)]
pub struct Reaper {
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Reaper {
    // == Spawn ==
    /// Spawns the sweep task with the given interval.
    ///
    /// The first sweep runs one full interval after construction, then every
    /// interval thereafter. Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<RwLock<CacheStore>>, sweep_interval: Duration) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            info!(interval_secs = sweep_interval.as_secs_f64(), "reaper started");

            let mut ticker = interval_at(Instant::now() + sweep_interval, sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        info!("reaper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        Self::sweep(&store).await;
                    }
                }
            }
        });

        Self {
            token,
            handle: Mutex::new(Some(handle)),
        }
    }

    // == Sweep ==
    /// Runs one sweep, isolating any panic to this tick.
    ///
    /// A faulting sweep is logged and dropped; the loop picks up again at the
    /// next tick rather than retrying immediately.
    async fn sweep(store: &RwLock<CacheStore>) {
        let result = {
            let mut guard = store.write().await;
            panic::catch_unwind(AssertUnwindSafe(|| guard.purge_expired()))
        };

        match result {
            Ok(0) => debug!("sweep found no expired entries"),
            Ok(removed) => info!(removed, "sweep removed expired entries"),
            Err(_) => error!("sweep panicked; resuming at next tick"),
        }
    }

    // == Stop ==
    /// Signals the task to stop at its next tick boundary.
    ///
    /// Idempotent and non-blocking; safe from any task or thread.
    pub fn stop(&self) {
        self.token.cancel();
    }

    // == Shutdown ==
    /// Stops the task and waits for it to finish.
    ///
    /// Idempotent; subsequent calls return immediately.
    pub async fn shutdown(&self) {
        self.stop();
        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            // The task exits at the cancellation branch of its select, so
            // this join is bounded by one lock acquisition.
            let _ = handle.await;
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
