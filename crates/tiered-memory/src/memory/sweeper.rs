//! Background expiry for short-term memory.
//!
//! Short-term memory expires entries lazily. An [`ExpirySweeper`] adds a tokio
//! task that calls [`ShortTermMemory::purge_expired`] on an interval, so
//! expired entries are reclaimed even when nobody stores or retrieves. This
//! makes the sweeper a second writer on the tier; it is opt-in.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::ShortTermMemory;

/// Handle to a running expiry task
#[derive(Debug)]
pub struct ExpirySweeper {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<usize>,
}

impl ExpirySweeper {
    /// Start purging `tier` every `interval`. Must be called within a tokio runtime.
    pub fn spawn(tier: Arc<ShortTermMemory>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut total = 0usize;

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => match tier.purge_expired() {
                        Ok(purged) => total += purged,
                        Err(e) => {
                            tracing::warn!("Expiry sweep failed, stopping sweeper: {}", e);
                            break;
                        }
                    },
                }
            }

            total
        });

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            "Short-term expiry sweeper started"
        );
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Whether the sweep task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the task and wait for it. Returns the number of entries it purged.
    pub async fn shutdown(self) -> usize {
        let _ = self.shutdown_tx.send(()).await;
        let total = match self.handle.await {
            Ok(total) => total,
            Err(e) => {
                tracing::warn!("Expiry sweeper task failed: {}", e);
                0
            }
        };
        tracing::info!(purged = total, "Short-term expiry sweeper stopped");
        total
    }
}
