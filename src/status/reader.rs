//! Status Reader: derives the open/closed verdict for a circuit.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::observability::metrics;
use crate::resilience::store_call;
use crate::status::StatusError;
use crate::store::StatusStore;

/// Result of a status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub circuit: String,
    pub is_closed: bool,
    /// Stored expiry, when a row exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<u64>,
}

/// Read-only view over the circuit table.
#[derive(Clone)]
pub struct StatusReader {
    store: Arc<dyn StatusStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl StatusReader {
    pub fn new(store: Arc<dyn StatusStore>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self { store, clock, timeout }
    }

    /// Look up `circuit` and compare its expiry with the current time.
    ///
    /// No row means closed. A row whose `closesAt` has passed is also closed,
    /// whether or not the expiry sweep has deleted it yet. Nothing is written.
    pub async fn get_status(&self, circuit: &str) -> Result<StatusView, StatusError> {
        if circuit.trim().is_empty() {
            return Err(StatusError::EmptyCircuitName);
        }

        let row = store_call("get", self.timeout, self.store.get(circuit))
            .await
            .map_err(|e| {
                tracing::warn!(circuit = %circuit, error = %e, "Circuit status read failed");
                metrics::record_store_error("get");
                StatusError::Store(e)
            })?;

        let now = self.clock.epoch_secs();
        let view = match row {
            None => StatusView {
                circuit: circuit.to_string(),
                is_closed: true,
                closes_at: None,
            },
            Some(row) => StatusView {
                circuit: circuit.to_string(),
                is_closed: row.is_closed_at(now),
                closes_at: Some(row.closes_at),
            },
        };

        tracing::debug!(
            circuit = %circuit,
            is_closed = view.is_closed,
            closes_at = ?view.closes_at,
            now,
            "Circuit status read"
        );
        metrics::record_status_read(circuit, view.is_closed);
        Ok(view)
    }

    /// Shorthand for `get_status(..).is_closed`.
    pub async fn is_closed(&self, circuit: &str) -> Result<bool, StatusError> {
        Ok(self.get_status(circuit).await?.is_closed)
    }
}
