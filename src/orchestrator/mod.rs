//! Orchestration of circuit-protected calls.
//!
//! # Data Flow
//! ```text
//! ExecuteRequest
//!     → machine.rs  CHECKING:  StatusReader::get_status(circuit)
//!                   open          → BLOCKED (nothing invoked)
//!                   closed        → EXECUTING
//!     → machine.rs  EXECUTING: Invoke::invoke under the attempt deadline
//!                   success       → SUCCEEDED
//!                   invalid       → error, circuit untouched
//!                   failed/timeout→ back off and retry, or TRIPPING
//!     → machine.rs  TRIPPING:  StatusWriter::trip_circuit(circuit, ttl)
//!                                 → BLOCKED
//! ```
//!
//! # Design Decisions
//! - `state.rs` holds pure transitions; `machine.rs` owns every side effect
//! - Settings are snapshotted per run, so a config reload never changes a run midway
//! - A failed trip write still ends the run blocked; the write failure is logged

pub mod machine;
pub mod state;
pub mod types;

pub use machine::Orchestrator;
pub use state::{BlockCause, Event, FailureKind, InvalidTransition, State};
pub use types::{
    AttemptRecord, ExecuteRequest, OrchestrationError, OrchestratorSettings, Outcome, RunReport,
};
