//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator, status reader/writer, store sweeper:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (when enabled)
//! ```
//!
//! # Design Decisions
//! - Every log line carries the circuit and target as fields, not in the message
//! - Recording a metric without an installed exporter is a no-op
//! - Label sets stay small: circuit, target, outcome, operation

pub mod logging;
pub mod metrics;
