//! Invocation of the protected operation.
//!
//! # Data Flow
//! ```text
//! Orchestrator (EXECUTING)
//!     → Invoke::invoke(targetRef, payload)
//!     → registry.rs (resolve targetRef by name)
//!         → hello.rs (in-process placeholder operation)
//!         → http.rs  (remote endpoint, JSON POST)
//! ```
//!
//! # Design Decisions
//! - The target is an injected capability, so tests substitute fakes freely
//! - Implementations only classify errors; deadlines belong to the orchestrator
//! - An unresolvable target is `Invalid`, never a reason to trip the circuit

pub mod hello;
pub mod http;
pub mod registry;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use hello::HelloWorld;
pub use http::HttpTarget;
pub use registry::Registry;

/// Name of an invokable target, resolved at call time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetRef(String);

impl TargetRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How an invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// The operation ran and failed; worth retrying.
    #[error("operation failed: {0}")]
    Failed(String),

    /// The request itself is malformed or the target cannot be resolved.
    #[error("invalid invocation: {0}")]
    Invalid(String),
}

impl InvokeError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, InvokeError::Failed(_))
    }
}

/// Capability to call a named target with a JSON payload.
#[async_trait]
pub trait Invoke: Send + Sync {
    async fn invoke(&self, target: &TargetRef, payload: &Value) -> Result<Value, InvokeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(InvokeError::Failed("boom".into()).is_retryable());
        assert!(!InvokeError::Invalid("no such target".into()).is_retryable());
    }

    #[test]
    fn test_target_ref_is_a_plain_string_on_the_wire() {
        let target: TargetRef = serde_json::from_str("\"HelloWorld\"").unwrap();
        assert_eq!(target.as_str(), "HelloWorld");
        assert_eq!(serde_json::to_string(&target).unwrap(), "\"HelloWorld\"");
    }
}
