//! Periodic reclamation of pastes whose store TTL has elapsed.
//!
//! Reads already refuse expired pastes; this task only frees space held by
//! records nobody asks for again.

use crate::PasteService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle to a running purge loop.
pub struct PurgeTask {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PurgeTask {
    /// Start purging every `interval`. The first pass runs one interval after
    /// startup.
    pub fn spawn(service: Arc<PasteService>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(purge_loop(service, interval, shutdown_rx));
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Stop the loop and wait for an in-flight pass to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.handle.await {
            tracing::warn!("Purge task ended abnormally: {}", err);
        }
    }
}

async fn purge_loop(
    service: Arc<PasteService>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_pass(service.clone()).await;
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
    tracing::debug!("Purge task stopped");
}

/// Run one reclamation pass on the blocking pool.
pub async fn run_pass(service: Arc<PasteService>) -> usize {
    match tokio::task::spawn_blocking(move || service.purge_expired()).await {
        Ok(Ok(purged)) => purged,
        Ok(Err(err)) => {
            tracing::warn!("Purge pass failed: {}", err);
            0
        }
        Err(err) => {
            tracing::warn!("Purge pass panicked: {}", err);
            0
        }
    }
}
