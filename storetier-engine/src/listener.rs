//! Background listener for live transaction updates.
//!
//! The listener owns no state of its own: every update goes through
//! [`EntitlementEngine::on_transaction_update`]. It stops when the update
//! stream ends or when [`UpdateListener::shutdown`] is called. An update that
//! is already being handled always completes before shutdown is honored.

use crate::engine::EntitlementEngine;
use crate::platform::{CommercePlatform, RecordStream};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Counters reported when the listener exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    /// Updates verified, recomputed and acknowledged.
    pub processed: usize,
    /// Updates dropped (failed verification or recompute).
    pub rejected: usize,
}

/// Handle to a running update listener.
pub struct UpdateListener {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<ListenerStats>,
}

impl UpdateListener {
    /// Subscribes to the platform's update stream and starts processing it.
    ///
    /// The subscription is taken before this returns, so updates pushed
    /// afterwards are never missed.
    pub fn spawn<P>(engine: Arc<EntitlementEngine<P>>) -> Self
    where
        P: CommercePlatform + 'static,
    {
        let updates = engine.platform().transaction_updates();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(engine, updates, shutdown_rx));
        Self { shutdown_tx, handle }
    }

    /// Returns true once the listener task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signals shutdown and waits for the listener to exit.
    pub async fn shutdown(self) -> ListenerStats {
        // Fails only if the task already exited and dropped its receiver.
        let _ = self.shutdown_tx.send(true);
        self.join().await
    }

    /// Waits for the listener to exit on its own (update stream ended).
    pub async fn join(self) -> ListenerStats {
        match self.handle.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Update listener task failed: {}", e);
                ListenerStats::default()
            }
        }
    }
}

async fn run<P: CommercePlatform>(
    engine: Arc<EntitlementEngine<P>>,
    mut updates: RecordStream,
    mut shutdown: watch::Receiver<bool>,
) -> ListenerStats {
    let mut stats = ListenerStats::default();
    // Set once the handle is dropped without a shutdown; the listener then
    // runs until the update stream ends.
    let mut detached = false;
    info!("Update listener started");

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed(), if !detached => {
                if changed.is_err() {
                    detached = true;
                    continue;
                }
                info!("Update listener shutting down");
                break;
            }
            next = updates.next() => {
                let Some(record) = next else {
                    info!("Transaction update stream ended");
                    break;
                };
                match engine.on_transaction_update(record).await {
                    Ok(_) => stats.processed += 1,
                    Err(e) => {
                        stats.rejected += 1;
                        warn!("Transaction update not applied: {}", e);
                    }
                }
            }
        }
    }

    info!(
        "Update listener stopped ({} processed, {} rejected)",
        stats.processed, stats.rejected
    );
    stats
}
