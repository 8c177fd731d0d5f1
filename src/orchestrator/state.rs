//! Orchestration state machine.
//!
//! # States
//! - Checking: read the circuit status
//! - Executing: invoke the target; retries stay in this state
//! - Tripping: record the circuit as open
//! - Succeeded / Blocked: terminal
//!
//! # State Transitions
//! ```text
//! Checking  → Blocked:   status read says open (or unknown, when configured to block)
//! Checking  → Executing: status read says closed (or unknown, when configured to allow)
//! Executing → Succeeded: attempt succeeded
//! Executing → Executing: retryable failure with attempts left
//! Executing → Tripping:  retryable failure with the budget spent
//! Tripping  → Blocked:   trip recorded or not
//! ```
//!
//! Transitions are pure; `machine.rs` performs the effects and feeds back events.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::resilience::RetryPolicy;

/// Why a retryable attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The operation returned an error.
    Failed,
    /// The operation did not finish within the per-attempt deadline.
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Failed => "failed",
            FailureKind::Timeout => "timeout",
        }
    }
}

/// Why a run ended blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "cause")]
pub enum BlockCause {
    /// The circuit was already open; nothing was invoked.
    AlreadyOpen,
    /// The status could not be read and the policy is to block.
    StatusUnknown,
    /// This run exhausted its attempts and tripped the circuit.
    Tripped { recorded: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Checking,
    Executing { attempt: u32 },
    Tripping { attempts: u32, last_failure: FailureKind },
    Succeeded { result: Value },
    Blocked { cause: BlockCause },
}

/// What the driver observed while acting on a state.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StatusRead { is_closed: bool },
    StatusUnknown { fail_open: bool },
    AttemptSucceeded { result: Value },
    AttemptFailed { kind: FailureKind },
    TripFinished { recorded: bool },
}

/// An event arrived in a state that cannot accept it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("event {event} is not valid in state {state}")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub event: &'static str,
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::Checking => "CHECKING",
            State::Executing { .. } => "EXECUTING",
            State::Tripping { .. } => "TRIPPING",
            State::Succeeded { .. } => "SUCCEEDED",
            State::Blocked { .. } => "BLOCKED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Succeeded { .. } | State::Blocked { .. })
    }

    /// Apply `event`, consulting `policy` for the attempt budget.
    pub fn on(self, event: Event, policy: &RetryPolicy) -> Result<State, InvalidTransition> {
        match (self, event) {
            (State::Checking, Event::StatusRead { is_closed: true })
            | (State::Checking, Event::StatusUnknown { fail_open: true }) => {
                Ok(State::Executing { attempt: 1 })
            }
            (State::Checking, Event::StatusRead { is_closed: false }) => Ok(State::Blocked {
                cause: BlockCause::AlreadyOpen,
            }),
            (State::Checking, Event::StatusUnknown { fail_open: false }) => Ok(State::Blocked {
                cause: BlockCause::StatusUnknown,
            }),

            (State::Executing { .. }, Event::AttemptSucceeded { result }) => {
                Ok(State::Succeeded { result })
            }
            (State::Executing { attempt }, Event::AttemptFailed { kind }) => {
                if policy.allows_another(attempt) {
                    Ok(State::Executing { attempt: attempt + 1 })
                } else {
                    Ok(State::Tripping {
                        attempts: attempt,
                        last_failure: kind,
                    })
                }
            }

            (State::Tripping { .. }, Event::TripFinished { recorded }) => Ok(State::Blocked {
                cause: BlockCause::Tripped { recorded },
            }),

            (state, event) => Err(InvalidTransition {
                state: state.name(),
                event: event.name(),
            }),
        }
    }
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::StatusRead { .. } => "StatusRead",
            Event::StatusUnknown { .. } => "StatusUnknown",
            Event::AttemptSucceeded { .. } => "AttemptSucceeded",
            Event::AttemptFailed { .. } => "AttemptFailed",
            Event::TripFinished { .. } => "TripFinished",
        }
    }
}
