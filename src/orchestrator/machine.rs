//! Orchestration driver.
//!
//! # Responsibilities
//! - Walk the state machine once from CHECKING to a terminal state
//! - Perform each state's effect: status read, invocation, trip write
//! - Enforce the per-attempt deadline and the backoff schedule
//! - Abort promptly when the caller cancels

use std::future::Future;
use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::ReadFailurePolicy;
use crate::invoke::{Invoke, InvokeError};
use crate::observability::metrics;
use crate::orchestrator::state::{Event, FailureKind, State};
use crate::orchestrator::types::{
    AttemptRecord, ExecuteRequest, OrchestrationError, OrchestratorSettings, Outcome, RunReport,
};
use crate::resilience::{with_timeout, Elapsed};
use crate::status::{StatusError, StatusReader, StatusWriter};

/// Stateless coordinator for circuit-protected calls.
///
/// Every [`run`](Orchestrator::run) is independent; the only shared state is
/// the status store behind the reader and writer.
#[derive(Clone)]
pub struct Orchestrator {
    reader: StatusReader,
    writer: StatusWriter,
    invoker: Arc<dyn Invoke>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        reader: StatusReader,
        writer: StatusWriter,
        invoker: Arc<dyn Invoke>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            reader,
            writer,
            invoker,
            settings,
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Perform one CHECKING → terminal traversal for `request`.
    #[tracing::instrument(
        name = "orchestrate",
        skip_all,
        fields(target_ref = %request.target_ref, circuit)
    )]
    pub async fn run(
        &self,
        request: ExecuteRequest,
        cancel: &CancellationToken,
    ) -> Result<RunReport, OrchestrationError> {
        let started = Instant::now();
        let circuit = request
            .circuit
            .clone()
            .unwrap_or_else(|| self.settings.circuit.clone());
        tracing::Span::current().record("circuit", circuit.as_str());

        if request.target_ref.as_str().trim().is_empty() {
            return Err(OrchestrationError::OperationInvalid {
                target: request.target_ref,
                message: "target reference must not be empty".to_string(),
            });
        }

        let mut record = AttemptRecord::new(request.target_ref.clone());
        let mut state = State::Checking;

        let result = loop {
            let event = match &state {
                State::Checking => self.check(&circuit, cancel).await,
                State::Executing { attempt } => {
                    self.execute(*attempt, &request, &mut record, cancel).await
                }
                State::Tripping { attempts, last_failure } => {
                    self.trip(&circuit, *attempts, *last_failure, cancel).await
                }
                State::Succeeded { result } => {
                    break Ok((Outcome::Succeeded { result: result.clone() }, None));
                }
                State::Blocked { cause } => break Ok((Outcome::Blocked, Some(*cause))),
            };
            let event = match event {
                Ok(event) => event,
                Err(e) => break Err(e),
            };

            let from = state.name();
            state = match state.on(event, &self.settings.retry) {
                Ok(next) => next,
                Err(e) => break Err(e.into()),
            };
            tracing::debug!(from, to = state.name(), "State transition");
        };

        record.elapsed = started.elapsed();

        let (outcome, blocked_by) = match result {
            Ok(terminal) => terminal,
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, attempts = record.attempts, "Orchestration failed");
                metrics::record_run(e.kind(), record.elapsed);
                return Err(e);
            }
        };

        tracing::info!(
            outcome = outcome.label(),
            blocked_by = ?blocked_by,
            attempts = record.attempts,
            elapsed = ?record.elapsed,
            "Orchestration finished"
        );
        metrics::record_run(outcome.label(), record.elapsed);

        Ok(RunReport {
            circuit,
            outcome,
            blocked_by,
            record,
        })
    }

    async fn check(&self, circuit: &str, cancel: &CancellationToken) -> Result<Event, OrchestrationError> {
        match cancellable(cancel, self.reader.get_status(circuit)).await? {
            Ok(view) => Ok(Event::StatusRead { is_closed: view.is_closed }),
            Err(StatusError::EmptyCircuitName) => Err(OrchestrationError::InvalidRequest(
                "circuit name must not be empty".to_string(),
            )),
            Err(e) => match self.settings.on_read_failure {
                ReadFailurePolicy::Propagate => Err(OrchestrationError::StoreUnavailable {
                    circuit: circuit.to_string(),
                    source: e,
                }),
                ReadFailurePolicy::Block => {
                    tracing::warn!(circuit = %circuit, error = %e, "Circuit status unknown, blocking call");
                    Ok(Event::StatusUnknown { fail_open: false })
                }
                ReadFailurePolicy::Allow => {
                    tracing::warn!(circuit = %circuit, error = %e, "Circuit status unknown, allowing call");
                    Ok(Event::StatusUnknown { fail_open: true })
                }
            },
        }
    }

    async fn execute(
        &self,
        attempt: u32,
        request: &ExecuteRequest,
        record: &mut AttemptRecord,
        cancel: &CancellationToken,
    ) -> Result<Event, OrchestrationError> {
        let wait = self.settings.retry.delay_before(attempt);
        if !wait.is_zero() {
            tracing::info!(attempt, delay = ?wait, "Backing off before retry");
            cancellable(cancel, tokio::time::sleep(wait)).await?;
            record.waits.push(wait);
        }

        record.attempts = attempt;
        let call = self.invoker.invoke(&request.target_ref, &request.payload);
        let result = cancellable(cancel, with_timeout(self.settings.invocation_timeout, call)).await?;

        let target = request.target_ref.as_str();
        match result {
            Ok(Ok(value)) => {
                metrics::record_attempt(target, "succeeded");
                Ok(Event::AttemptSucceeded { result: value })
            }
            Ok(Err(InvokeError::Invalid(message))) => {
                metrics::record_attempt(target, "invalid");
                Err(OrchestrationError::OperationInvalid {
                    target: request.target_ref.clone(),
                    message,
                })
            }
            Ok(Err(InvokeError::Failed(message))) => {
                tracing::warn!(attempt, error = %message, "Attempt failed");
                metrics::record_attempt(target, FailureKind::Failed.as_str());
                record.last_error = Some(FailureKind::Failed);
                Ok(Event::AttemptFailed { kind: FailureKind::Failed })
            }
            Err(Elapsed(limit)) => {
                tracing::warn!(attempt, timeout = ?limit, "Attempt timed out");
                metrics::record_attempt(target, FailureKind::Timeout.as_str());
                record.last_error = Some(FailureKind::Timeout);
                Ok(Event::AttemptFailed { kind: FailureKind::Timeout })
            }
        }
    }

    async fn trip(
        &self,
        circuit: &str,
        attempts: u32,
        last_failure: FailureKind,
        cancel: &CancellationToken,
    ) -> Result<Event, OrchestrationError> {
        let ttl = self.settings.time_to_live;
        match cancellable(cancel, self.writer.trip_circuit(circuit, ttl)).await? {
            Ok(row) => {
                tracing::info!(
                    circuit = %circuit,
                    attempts,
                    last_failure = last_failure.as_str(),
                    closes_at = row.closes_at,
                    "Attempts exhausted, circuit opened"
                );
                metrics::record_trip(circuit, true);
                Ok(Event::TripFinished { recorded: true })
            }
            Err(e) => {
                tracing::warn!(
                    circuit = %circuit,
                    attempts,
                    error = %e,
                    "Attempts exhausted but the trip could not be recorded"
                );
                metrics::record_trip(circuit, false);
                Ok(Event::TripFinished { recorded: false })
            }
        }
    }
}

/// Race `fut` against cancellation of the run.
async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output, OrchestrationError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(OrchestrationError::Cancelled),
        out = fut => Ok(out),
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .finish()
    }
}
