//! Orchestration request, outcome and error types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::{CoordinatorConfig, ReadFailurePolicy};
use crate::invoke::TargetRef;
use crate::orchestrator::state::{BlockCause, FailureKind, InvalidTransition};
use crate::resilience::RetryPolicy;
use crate::status::StatusError;

/// Input of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    /// Target to invoke; `targetLambda` is accepted as well.
    #[serde(alias = "targetLambda")]
    pub target_ref: TargetRef,

    /// Circuit guarding the call; the configured circuit when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit: Option<String>,

    #[serde(default)]
    pub payload: Value,
}

impl ExecuteRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target_ref: TargetRef::new(target),
            circuit: None,
            payload: Value::Null,
        }
    }

    pub fn with_circuit(mut self, circuit: impl Into<String>) -> Self {
        self.circuit = Some(circuit.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// The externally observable result of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Outcome {
    Succeeded { result: Value },
    Blocked,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Succeeded { .. } => "succeeded",
            Outcome::Blocked => "blocked",
        }
    }
}

/// In-memory account of the attempts made during one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub target: TargetRef,
    pub attempts: u32,
    pub last_error: Option<FailureKind>,
    /// Backoff waits actually taken, in order.
    pub waits: Vec<Duration>,
    pub elapsed: Duration,
}

impl AttemptRecord {
    pub fn new(target: TargetRef) -> Self {
        Self {
            target,
            attempts: 0,
            last_error: None,
            waits: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Everything known about a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub circuit: String,
    pub outcome: Outcome,
    pub blocked_by: Option<BlockCause>,
    pub record: AttemptRecord,
}

/// Failures that cross the orchestrator boundary instead of an outcome.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The request could not be formed into a run.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The target rejected the invocation; the circuit was not tripped.
    #[error("invalid invocation of '{target}': {message}")]
    OperationInvalid { target: TargetRef, message: String },

    /// The circuit status could not be read.
    #[error("status of circuit '{circuit}' unknown: {source}")]
    StoreUnavailable {
        circuit: String,
        #[source]
        source: StatusError,
    },

    #[error("orchestration cancelled")]
    Cancelled,

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

impl OrchestrationError {
    /// Stable tag for callers and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestrationError::InvalidRequest(_) => "invalid_request",
            OrchestrationError::OperationInvalid { .. } => "operation_invalid",
            OrchestrationError::StoreUnavailable { .. } => "store_unavailable",
            OrchestrationError::Cancelled => "cancelled",
            OrchestrationError::InvalidTransition(_) => "internal",
        }
    }
}

/// Per-run settings, taken from the configuration snapshot at run start.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub circuit: String,
    pub time_to_live: Duration,
    pub invocation_timeout: Duration,
    pub retry: RetryPolicy,
    pub on_read_failure: ReadFailurePolicy,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&CoordinatorConfig::default())
    }
}

impl From<&CoordinatorConfig> for OrchestratorSettings {
    fn from(config: &CoordinatorConfig) -> Self {
        Self {
            circuit: config.circuit.name.clone(),
            time_to_live: config.circuit.time_to_live.as_std(),
            invocation_timeout: Duration::from_secs(config.invocation.timeout_secs),
            retry: RetryPolicy::from(&config.retry),
            on_read_failure: config.circuit.on_read_failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_contract() {
        let ok = Outcome::Succeeded { result: json!({"body": "hi"}) };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"outcome": "succeeded", "result": {"body": "hi"}})
        );
        assert_eq!(serde_json::to_value(Outcome::Blocked).unwrap(), json!({"outcome": "blocked"}));
    }

    #[test]
    fn test_request_accepts_legacy_field() {
        let req: ExecuteRequest = serde_json::from_value(json!({"targetLambda": "HelloWorld"})).unwrap();
        assert_eq!(req, ExecuteRequest::new("HelloWorld"));

        let req: ExecuteRequest = serde_json::from_value(json!({
            "targetRef": "Ledger",
            "circuit": "Payments",
            "payload": {"amount": 3}
        }))
        .unwrap();
        assert_eq!(req.circuit.as_deref(), Some("Payments"));
        assert_eq!(req.payload["amount"], 3);
    }

    #[test]
    fn test_settings_from_config() {
        let settings = OrchestratorSettings::default();
        assert_eq!(settings.circuit, "HelloWorld");
        assert_eq!(settings.invocation_timeout, Duration::from_secs(12));
        assert_eq!(settings.time_to_live, Duration::from_secs(60));
        assert_eq!(settings.retry.max_attempts, 3);
    }
}
