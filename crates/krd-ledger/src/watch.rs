//! Stoppable cancellation poll task.
//!
//! # Design
//!
//! The presentation layer re-renders countdowns once per second, but only
//! while at least one order is still cancellable. [`CancelWatch`] models
//! that as an explicit periodic task rather than an always-on loop:
//!
//! - started when the first cancellable order appears;
//! - runs `on_tick` each period while `still_cancellable()` holds;
//! - stops itself the moment nothing is cancellable (no wasted wake-ups);
//! - can be stopped early via [`stop`][CancelWatch::stop], and ends when
//!   the handle is dropped.
//!
//! Ticks only read derived state — re-running one with no state change is
//! a no-op, so the callbacks need no idempotency bookkeeping of their own.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a running cancellation poll task.
pub struct CancelWatch {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CancelWatch {
    /// Spawn the poll loop.
    ///
    /// Each period the task first asks `still_cancellable()`; when it turns
    /// false the task ends without a final `on_tick`. The first check fires
    /// immediately, so callers see an initial render without waiting a full
    /// period.
    pub fn spawn<F, G>(period: Duration, still_cancellable: F, mut on_tick: G) -> Self
    where
        F: Fn() -> bool + Send + 'static,
        G: FnMut() + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !still_cancellable() {
                            debug!("no cancellable orders remain, poll task ending");
                            break;
                        }
                        on_tick();
                    }
                    // Explicit stop, or every watch handle dropped.
                    _ = stop_rx.changed() => break,
                }
            }
        });
        Self { stop_tx, handle }
    }

    /// Request the task to end at the next scheduling point.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// `true` once the loop has exited (self-stopped or via [`stop`]).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to end.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
