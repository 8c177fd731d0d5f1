//! Status Writer: records a trip.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::observability::metrics;
use crate::resilience::store_call;
use crate::status::StatusError;
use crate::store::{CircuitStatus, StatusStore};

#[derive(Clone)]
pub struct StatusWriter {
    store: Arc<dyn StatusStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl StatusWriter {
    pub fn new(store: Arc<dyn StatusStore>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self { store, clock, timeout }
    }

    /// Open `circuit` until `now + ttl`.
    ///
    /// The row is overwritten, so a new trip restarts the cooldown from the
    /// current moment instead of extending the previous one.
    pub async fn trip_circuit(&self, circuit: &str, ttl: Duration) -> Result<CircuitStatus, StatusError> {
        if circuit.trim().is_empty() {
            return Err(StatusError::EmptyCircuitName);
        }
        if ttl.is_zero() {
            return Err(StatusError::InvalidTtl);
        }

        let closes_at = self
            .clock
            .epoch_secs_after(ttl)
            .ok_or(StatusError::InvalidTtl)?;
        let row = CircuitStatus::new(circuit, closes_at);
        store_call("put", self.timeout, self.store.put(row.clone()))
            .await
            .map_err(|e| {
                metrics::record_store_error("put");
                StatusError::Store(e)
            })?;

        tracing::info!(
            circuit = %circuit,
            closes_at = row.closes_at,
            ttl = ?ttl,
            "Circuit tripped"
        );
        Ok(row)
    }
}
