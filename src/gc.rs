//! Background expiry sweeper.
//!
//! Reads expire lazily: an expired item is invisible to `get` but stays in
//! the map. Items written once and never read again would pile up forever,
//! so the sweeper calls `Store::delete_expired` on every tick of a fixed
//! interval.
//!
//! The sweeper always runs on a dedicated thread driving its own
//! current-thread runtime, so it keeps ticking whatever happens to the
//! caller's runtime. It is stopped through a `watch` channel, so stopping
//! never blocks, and it holds only a `Weak` reference to the store, so it
//! never keeps a dropped cache alive.

use std::sync::{Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::runtime::Builder;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{CacheError, CacheResult};
use crate::storage::Store;

const THREAD_NAME: &str = "expiring-map-gc";

/// Start/stop state of the sweeper for one cache.
///
/// Running means a live handle whose thread has not exited. Dropping the
/// controller stops the sweeper.
#[derive(Debug)]
pub struct GcController {
    interval: Duration,
    running: Mutex<Option<GcHandle>>,
}

impl GcController {
    /// Create a stopped controller that sweeps every `interval` once started.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: Mutex::new(None),
        }
    }

    /// Stopped -> Running.
    pub fn start<E>(&self, store: Weak<Store<E>>) -> CacheResult<()>
    where
        E: Send + Sync + 'static,
    {
        let mut running = self.live_handle();
        if running.is_some() {
            return Err(CacheError::GcAlreadyRunning);
        }
        *running = Some(GcHandle::spawn(store, self.interval)?);
        info!(interval_ms = self.interval.as_millis(), "Background expiry sweeper started");
        Ok(())
    }

    /// Running -> Stopped. Signals the task and returns without waiting.
    pub fn stop(&self) -> CacheResult<()> {
        let handle = self.live_handle().take().ok_or(CacheError::GcNotRunning)?;
        handle.stop();
        info!("Background expiry sweeper stopped");
        Ok(())
    }

    /// Check whether a sweeper thread is alive.
    pub fn is_running(&self) -> bool {
        self.live_handle().is_some()
    }

    /// Lock the state, clearing a handle whose thread has already exited.
    fn live_handle(&self) -> MutexGuard<'_, Option<GcHandle>> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.as_ref().is_some_and(GcHandle::is_finished) {
            *running = None;
        }
        running
    }
}

/// Stop signal and thread for one running sweeper.
///
/// When this handle is dropped, the sweeper stops.
#[derive(Debug)]
struct GcHandle {
    shutdown_tx: watch::Sender<bool>,
    thread: JoinHandle<()>,
}

impl GcHandle {
    fn spawn<E>(store: Weak<Store<E>>, period: Duration) -> CacheResult<Self>
    where
        E: Send + Sync + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = sweeper_loop(store, period, shutdown_rx);

        let runtime = Builder::new_current_thread().enable_time().build()?;
        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(task))?;

        Ok(Self { shutdown_tx, thread })
    }

    fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    fn stop(&self) {
        // No receiver means the task already exited.
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for GcHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
async fn sweeper_loop<E>(
    store: Weak<Store<E>>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let Some(store) = store.upgrade() else {
            debug!("Cache dropped, expiry sweeper exiting");
            return;
        };

        let removed = store.delete_expired();
        if removed > 0 {
            debug!(
                removed = removed,
                remaining = store.len(),
                "Expired items cleaned up"
            );
        }
    }
}
