//! Periodic refresh scheduling for the active view
//!
//! One poller exists per active view at a time. It ticks on a fixed interval
//! and pushes signals over a channel; the engine owns the loop that turns
//! ticks into refreshes. Switching views stops the old poller before a new
//! one starts, so two timers never feed the same state.

use flume::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::state::ActiveView;

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Refresh interval in seconds
    pub poll_interval_seconds: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
        }
    }
}

/// Signal emitted by a poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollSignal {
    /// Time to refresh the view (the first tick fires immediately on start)
    Tick,
    /// Poller is stopping
    Shutdown,
}

/// Fixed-interval poller for one view
pub struct ViewPoller {
    view: ActiveView,
    config: PollConfig,
    running: Arc<AtomicBool>,
    signal_tx: Sender<PollSignal>,
}

impl ViewPoller {
    /// Create a new poller and the receiving end of its signal channel
    pub fn new(view: ActiveView, config: PollConfig) -> (Self, Receiver<PollSignal>) {
        let (tx, rx) = flume::unbounded();

        let poller = Self {
            view,
            config,
            running: Arc::new(AtomicBool::new(false)),
            signal_tx: tx,
        };

        (poller, rx)
    }

    pub fn view(&self) -> ActiveView {
        self.view
    }

    /// Check if the poller is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the poller as running (call before spawning the poll task)
    pub fn mark_running(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Stop the poller
    ///
    /// Synchronous: the running flag is cleared immediately, and a shutdown
    /// signal wakes the consumer so a stale tick is never acted on after
    /// this returns.
    pub fn stop(&self) {
        info!("Stopping poller for view: {:?}", self.view);
        self.running.store(false, Ordering::SeqCst);
        let _ = self.signal_tx.send(PollSignal::Shutdown);
    }

    /// Run the poll loop
    ///
    /// Sends one tick immediately, then one per interval, until stopped.
    /// The running flag should be set via `mark_running()` before calling.
    pub async fn run(&self) {
        let interval = tokio::time::Duration::from_secs(self.config.poll_interval_seconds);
        let mut poll_interval = tokio::time::interval(interval);

        info!(
            "Starting poll loop for view: {:?} (interval: {:?})",
            self.view, interval
        );

        let mut tick_count = 0u64;

        while self.running.load(Ordering::SeqCst) {
            poll_interval.tick().await;

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            tick_count += 1;
            debug!("Poll tick #{} for view: {:?}", tick_count, self.view);

            if let Err(e) = self.signal_tx.send(PollSignal::Tick) {
                error!(
                    "Failed to send poll tick #{} for view {:?}: {}",
                    tick_count, self.view, e
                );
                break;
            }
        }

        info!(
            "Poll loop stopped for view: {:?} after {} ticks",
            self.view, tick_count
        );
    }
}
