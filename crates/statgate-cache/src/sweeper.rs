//! Background expiry sweeper.

use crate::Cache;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawns the periodic expiry sweep for `cache`.
///
/// Each tick is panic-isolated: a bug in eviction logs a warning and the
/// sweeper keeps running. The task exits when `token` is cancelled or the
/// cache is shut down.
pub fn spawn_sweeper(cache: Arc<Cache>, token: CancellationToken) -> JoinHandle<()> {
    let period = cache.cleanup_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it so the sweep cadence
        // starts one full period after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if cache.is_shut_down() {
                        break;
                    }
                    let sweep = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        cache.evict_expired()
                    }));
                    match sweep {
                        Ok(removed) if removed > 0 => {
                            tracing::debug!(cache = %cache.name(), removed, "sweep complete");
                        }
                        Ok(_) => {}
                        Err(_) => {
                            tracing::warn!(cache = %cache.name(), "sweep panicked, continuing");
                        }
                    }
                }
            }
        }
        tracing::debug!(cache = %cache.name(), "sweeper stopped");
    })
}
