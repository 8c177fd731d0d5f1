//! Circuit rows and store error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of the circuit table.
///
/// A row only exists while the circuit is, or recently was, open. Its absence
/// means closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitStatus {
    /// Circuit identifier (table key).
    pub circuit: String,
    /// Epoch seconds from which the circuit counts as closed again. Also the expiry field.
    pub closes_at: u64,
}

impl CircuitStatus {
    pub fn new(circuit: impl Into<String>, closes_at: u64) -> Self {
        Self {
            circuit: circuit.into(),
            closes_at,
        }
    }

    /// Whether the cooldown has elapsed at `now` (epoch seconds).
    ///
    /// A zero `closes_at` marks a circuit that never tripped.
    pub fn is_closed_at(&self, now: u64) -> bool {
        self.closes_at == 0 || now >= self.closes_at
    }
}

/// Errors that can occur while talking to the status store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A store operation did not finish within its deadline.
    #[error("store operation '{operation}' timed out after {timeout_ms} ms")]
    Timeout { operation: &'static str, timeout_ms: u64 },

    /// Persisted data could not be decoded.
    #[error("store data corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Corrupt(e.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_wire_format() {
        let row = CircuitStatus::new("HelloWorld", 1_700_000_060);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({"circuit": "HelloWorld", "closesAt": 1_700_000_060u64}));
    }

    #[test]
    fn test_closed_comparison() {
        let row = CircuitStatus::new("c", 100);
        assert!(!row.is_closed_at(99));
        assert!(row.is_closed_at(100));
        assert!(row.is_closed_at(101));
        assert!(CircuitStatus::new("c", 0).is_closed_at(0));
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::Timeout { operation: "get", timeout_ms: 3000 };
        assert_eq!(err.to_string(), "store operation 'get' timed out after 3000 ms");
    }
}
