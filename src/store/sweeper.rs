//! Background expiry sweep.
//!
//! # Responsibilities
//! - Periodically delete rows whose `closesAt` has passed
//! - Model the native TTL deletion of a managed table
//!
//! Readers never rely on this task: a row that outlived its `closesAt`
//! still reads as closed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::clock::Clock;
use crate::observability::metrics;
use crate::store::StatusStore;

pub struct ExpirySweeper {
    store: Arc<dyn StatusStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(store: Arc<dyn StatusStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            store,
            clock,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if self.interval.is_zero() {
            tracing::info!("Expiry sweep disabled");
            return;
        }

        tracing::info!(interval = ?self.interval, "Expiry sweeper starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Expiry sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run a single sweep, returning how many rows were removed.
    pub async fn sweep_once(&self) -> usize {
        let now = self.clock.epoch_secs();
        match self.store.sweep_expired(now).await {
            Ok(0) => 0,
            Ok(removed) => {
                tracing::debug!(removed, now, "Expired circuit rows swept");
                metrics::record_swept(removed);
                removed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Expiry sweep failed");
                metrics::record_store_error("sweep");
                0
            }
        }
    }
}
