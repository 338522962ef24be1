//! Expiration Sweeper Task
//!
//! Background task that runs the sweeps requested by cache writes, plus a
//! periodic safety sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheEngine, SharedEngine};

/// Spawns the sweeper for `engine`.
///
/// The engine raises `signal` after every successful write. The sweeper waits
/// `delay` so bursts of writes share one sweep, then drains the pending sweep.
/// Independently, every `interval` it sweeps expired entries.
///
/// # Arguments
/// * `engine` - Shared engine, which must have been built with the same `signal`
/// * `signal` - Raised by the engine when a sweep is requested
/// * `delay` - Pause between a request and the sweep
/// * `interval` - Period of the safety sweep
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweep_task(
    engine: SharedEngine,
    signal: Arc<Notify>,
    delay: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    let interval = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        info!(
            "Starting expiration sweeper (delay {:?}, interval {:?})",
            delay, interval
        );

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = signal.notified() => {
                    tokio::time::sleep(delay).await;
                    let removed = sweep(&engine, CacheEngine::run_pending_sweep).await;
                    debug!("Deferred sweep removed {} entries", removed);
                }
                _ = ticker.tick() => {
                    let removed = sweep(&engine, CacheEngine::clear_expired).await;
                    debug!("Periodic sweep removed {} entries", removed);
                }
            }
        }
    })
}

/// Runs `op` under the engine lock on the blocking pool, since stores may do
/// file I/O.
async fn sweep(engine: &SharedEngine, op: fn(&mut CacheEngine) -> usize) -> usize {
    let engine = Arc::clone(engine);
    match tokio::task::spawn_blocking(move || op(&mut *engine.lock())).await {
        Ok(removed) => removed,
        Err(e) => {
            warn!("Sweep task failed: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{shared, EngineOptions};
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn engine_with_signal(signal: Arc<Notify>) -> SharedEngine {
        shared(
            CacheEngine::new(MemoryStore::new(), MemoryStore::new(), EngineOptions::default())
                .with_sweep_signal(signal),
        )
    }

    #[tokio::test]
    async fn test_write_triggers_deferred_sweep() {
        let signal = Arc::new(Notify::new());
        let engine = engine_with_signal(signal.clone());

        engine.lock().store("short", json!("value"), Some(1));
        tokio::time::sleep(Duration::from_millis(1100)).await;

        let handle = spawn_sweep_task(
            engine.clone(),
            signal,
            Duration::from_millis(10),
            Duration::from_secs(3600),
        );

        // This write raises the signal; the sweep reclaims the expired entry
        engine.lock().store("other", json!("value"), Some(60));
        tokio::time::sleep(Duration::from_millis(200)).await;

        {
            let guard = engine.lock();
            assert!(guard.tier_of("short").is_none(), "expired entry should be swept");
            assert_eq!(guard.size(), 1);
            assert!(!guard.sweep_pending());
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_periodic_sweep_preserves_valid_entries() {
        let signal = Arc::new(Notify::new());
        let engine = engine_with_signal(signal.clone());

        engine.lock().store("long_lived", json!("value"), Some(3600));

        let handle = spawn_sweep_task(
            engine.clone(),
            signal,
            Duration::from_millis(10),
            Duration::from_millis(100),
        );
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(engine.lock().load("long_lived", json!(null)), json!("value"));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_can_be_aborted() {
        let signal = Arc::new(Notify::new());
        let engine = engine_with_signal(signal.clone());

        let handle = spawn_sweep_task(engine, signal, Duration::ZERO, Duration::from_secs(1));
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
