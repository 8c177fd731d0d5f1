//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the coordinator.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::duration::{self, GoDuration};

/// Root configuration for the circuit-breaker coordinator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Status store settings.
    pub store: StoreConfig,

    /// The protected circuit and its cooldown.
    pub circuit: CircuitConfig,

    /// Retry schedule for the protected operation.
    pub retry: RetryConfig,

    /// Per-attempt invocation limits.
    pub invocation: InvocationConfig,

    /// Named invocation targets.
    pub targets: BTreeMap<String, TargetConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout for the HTTP surface in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Which status store implementation backs the circuit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    File,
}

/// Status store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Table identity (`DDB_TABLE_NAME`).
    pub table_name: String,

    /// Directory holding `<table_name>.json` for the file backend.
    pub data_dir: String,

    /// Timeout applied to every store operation, in milliseconds.
    pub timeout_ms: u64,

    /// Interval of the expiry sweep in seconds (0 disables it).
    pub sweep_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            table_name: "circuit-breaker".to_string(),
            data_dir: "./data".to_string(),
            timeout_ms: 3_000,
            sweep_interval_secs: 60,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// What a run does when the status read itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadFailurePolicy {
    /// Surface `StoreUnavailable` to the caller.
    #[default]
    Propagate,
    /// Treat the circuit as open and report the call blocked.
    Block,
    /// Treat the circuit as closed and invoke the target anyway.
    Allow,
}

/// Circuit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitConfig {
    /// Default circuit name (`DDB_CIRCUIT_NAME`).
    pub name: String,

    /// Cooldown after a trip (`DDB_TIME_TO_LIVE_DURATION`), e.g. "1m".
    #[serde(with = "duration::serde_go")]
    pub time_to_live: GoDuration,

    pub on_read_failure: ReadFailurePolicy,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            name: "HelloWorld".to_string(),
            time_to_live: GoDuration::from(Duration::from_secs(60)),
            on_read_failure: ReadFailurePolicy::Propagate,
        }
    }
}

/// Jitter applied on top of the exponential schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JitterStrategy {
    #[default]
    None,
    /// Uniformly random delay in `[0, computed delay]`.
    Full,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds.
    pub interval_ms: u64,

    /// Multiplier applied to the delay after each retry.
    pub backoff_rate: f64,

    /// Upper bound for a single delay in milliseconds.
    pub max_delay_ms: Option<u64>,

    pub jitter: JitterStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            interval_ms: 2_000,
            backoff_rate: 1.5,
            max_delay_ms: None,
            jitter: JitterStrategy::None,
        }
    }
}

/// Invocation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InvocationConfig {
    /// Hard timeout for a single attempt in seconds.
    pub timeout_secs: u64,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self { timeout_secs: 12 }
    }
}

/// How a named target is reached.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetConfig {
    /// An in-process handler registered under the same name.
    Builtin,
    /// A remote endpoint receiving the payload as a JSON POST.
    Http {
        url: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
