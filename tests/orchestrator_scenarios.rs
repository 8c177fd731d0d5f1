//! End-to-end orchestration scenarios against fake targets and stores.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use breaker_coordinator::config::ReadFailurePolicy;
use breaker_coordinator::orchestrator::{
    BlockCause, ExecuteRequest, FailureKind, OrchestrationError, OrchestratorSettings, Outcome,
};
use breaker_coordinator::store::{CircuitStatus, StatusStore};

mod common;

use common::{mock_clock, orchestrator, FaultyStore, ScriptedInvoker, Step, START};

fn request() -> ExecuteRequest {
    ExecuteRequest::new("Flaky").with_circuit("HelloWorld")
}

#[tokio::test(start_paused = true)]
async fn test_always_timing_out_target_trips_after_three_attempts() {
    let store = FaultyStore::new();
    let invoker = ScriptedInvoker::always(Step::Hang);
    let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), OrchestratorSettings::default());

    let started = tokio::time::Instant::now();
    let report = orch.run(request(), &CancellationToken::new()).await.unwrap();

    assert_eq!(report.outcome, Outcome::Blocked);
    assert_eq!(report.blocked_by, Some(BlockCause::Tripped { recorded: true }));
    assert_eq!(invoker.calls(), 3);
    assert_eq!(report.record.waits, vec![Duration::from_secs(2), Duration::from_secs(3)]);
    assert_eq!(report.record.last_error, Some(FailureKind::Timeout));

    // Three 12 s deadlines plus the 2 s and 3 s waits, in virtual time.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(41) && elapsed < Duration::from_secs(42), "{:?}", elapsed);

    assert_eq!(store.puts(), vec![CircuitStatus::new("HelloWorld", START + 60)]);
}

#[tokio::test]
async fn test_open_circuit_invokes_nothing() {
    let store = FaultyStore::new();
    store.inner.put(CircuitStatus::new("HelloWorld", START + 30)).await.unwrap();
    let invoker = ScriptedInvoker::always(Step::Succeed(json!("unused")));
    let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), OrchestratorSettings::default());

    let report = orch.run(request(), &CancellationToken::new()).await.unwrap();

    assert_eq!(report.outcome, Outcome::Blocked);
    assert_eq!(report.blocked_by, Some(BlockCause::AlreadyOpen));
    assert_eq!(invoker.calls(), 0);
    assert!(store.puts().is_empty());
}

#[tokio::test]
async fn test_success_leaves_store_untouched() {
    let store = FaultyStore::new();
    let invoker = ScriptedInvoker::always(Step::Succeed(json!({"statusCode": 200})));
    let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), OrchestratorSettings::default());

    let report = orch.run(request(), &CancellationToken::new()).await.unwrap();

    assert_eq!(report.outcome, Outcome::Succeeded { result: json!({"statusCode": 200}) });
    assert_eq!(invoker.calls(), 1);
    assert!(store.puts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_recovers_within_retry_budget() {
    let store = FaultyStore::new();
    let invoker = ScriptedInvoker::new(vec![Step::Fail, Step::Hang, Step::Succeed(json!("third time"))]);
    let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), OrchestratorSettings::default());

    let report = orch.run(request(), &CancellationToken::new()).await.unwrap();

    assert_eq!(report.outcome, Outcome::Succeeded { result: json!("third time") });
    assert_eq!(invoker.calls(), 3);
    assert_eq!(report.record.waits, vec![Duration::from_secs(2), Duration::from_secs(3)]);
    assert!(store.puts().is_empty());
}

#[tokio::test]
async fn test_non_retryable_error_propagates_without_trip() {
    let store = FaultyStore::new();
    let invoker = ScriptedInvoker::always(Step::Invalid);
    let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), OrchestratorSettings::default());

    let err = orch.run(request(), &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, OrchestrationError::OperationInvalid { .. }));
    assert_eq!(invoker.calls(), 1);
    assert!(store.puts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_trip_write_failure_still_blocks() {
    let store = FaultyStore::new();
    store.fail_put.store(true, Ordering::SeqCst);
    let invoker = ScriptedInvoker::always(Step::Fail);
    let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), OrchestratorSettings::default());

    let report = orch.run(request(), &CancellationToken::new()).await.unwrap();

    assert_eq!(report.outcome, Outcome::Blocked);
    assert_eq!(report.blocked_by, Some(BlockCause::Tripped { recorded: false }));
    assert_eq!(store.puts().len(), 1);
    assert!(store.inner.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_trip_then_recover_after_ttl() {
    let store = FaultyStore::new();
    let clock = mock_clock();
    let settings = OrchestratorSettings {
        time_to_live: Duration::from_secs(1),
        ..OrchestratorSettings::default()
    };

    let failing = ScriptedInvoker::always(Step::Fail);
    let report = orchestrator(store.clone(), clock.clone(), failing, settings.clone())
        .run(request(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.blocked_by, Some(BlockCause::Tripped { recorded: true }));
    assert_eq!(store.puts(), vec![CircuitStatus::new("HelloWorld", START + 1)]);

    let healthy = ScriptedInvoker::always(Step::Succeed(json!("ok")));
    let orch = orchestrator(store.clone(), clock.clone(), healthy.clone(), settings);

    let report = orch.run(request(), &CancellationToken::new()).await.unwrap();
    assert_eq!(report.blocked_by, Some(BlockCause::AlreadyOpen));
    assert_eq!(healthy.calls(), 0);

    clock.advance(Duration::from_secs(1));

    let report = orch.run(request(), &CancellationToken::new()).await.unwrap();
    assert_eq!(report.outcome, Outcome::Succeeded { result: json!("ok") });
    assert_eq!(healthy.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_trips_leave_one_open_row() {
    let store = FaultyStore::new();
    let clock = mock_clock();
    let invoker = ScriptedInvoker::always(Step::Fail);
    let orch = orchestrator(store.clone(), clock, invoker.clone(), OrchestratorSettings::default());

    let cancel = CancellationToken::new();
    let (a, b) = tokio::join!(orch.run(request(), &cancel), orch.run(request(), &cancel));

    for report in [a.unwrap(), b.unwrap()] {
        assert_eq!(report.blocked_by, Some(BlockCause::Tripped { recorded: true }));
    }
    assert_eq!(invoker.calls(), 6);
    assert_eq!(store.puts().len(), 2);
    assert_eq!(
        store.inner.list().await.unwrap(),
        vec![CircuitStatus::new("HelloWorld", START + 60)]
    );
}

#[tokio::test]
async fn test_read_failure_policies() {
    let cases = [
        (ReadFailurePolicy::Propagate, None, 0),
        (ReadFailurePolicy::Block, Some(BlockCause::StatusUnknown), 0),
        (ReadFailurePolicy::Allow, None, 1),
    ];

    for (policy, expected_cause, expected_calls) in cases {
        let store = FaultyStore::new();
        store.fail_get.store(true, Ordering::SeqCst);
        let invoker = ScriptedInvoker::always(Step::Succeed(json!("ran")));
        let settings = OrchestratorSettings {
            on_read_failure: policy,
            ..OrchestratorSettings::default()
        };
        let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), settings);

        let result = orch.run(request(), &CancellationToken::new()).await;
        match policy {
            ReadFailurePolicy::Propagate => {
                assert!(matches!(result, Err(OrchestrationError::StoreUnavailable { .. })));
            }
            ReadFailurePolicy::Block => {
                assert_eq!(result.unwrap().blocked_by, expected_cause);
            }
            ReadFailurePolicy::Allow => {
                assert_eq!(result.unwrap().outcome, Outcome::Succeeded { result: json!("ran") });
            }
        }
        assert_eq!(invoker.calls(), expected_calls, "policy {:?}", policy);
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_status_read_times_out() {
    let store = FaultyStore::new();
    store.hang_get.store(true, Ordering::SeqCst);
    let invoker = ScriptedInvoker::always(Step::Succeed(json!("unused")));
    let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), OrchestratorSettings::default());

    let err = orch.run(request(), &CancellationToken::new()).await.unwrap_err();

    assert_eq!(err.kind(), "store_unavailable");
    assert_eq!(invoker.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_aborts_in_flight_attempt() {
    let store = FaultyStore::new();
    let invoker = ScriptedInvoker::always(Step::Hang);
    let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), OrchestratorSettings::default());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        trigger.cancel();
    });

    let err = orch.run(request(), &cancel).await.unwrap_err();

    assert!(matches!(err, OrchestrationError::Cancelled));
    assert_eq!(invoker.calls(), 1);
    assert!(store.puts().is_empty());
}

#[tokio::test]
async fn test_default_circuit_applies_when_request_names_none() {
    let store = FaultyStore::new();
    store.inner.put(CircuitStatus::new("HelloWorld", START + 10)).await.unwrap();
    let invoker = ScriptedInvoker::always(Step::Succeed(json!("unused")));
    let orch = orchestrator(store.clone(), mock_clock(), invoker.clone(), OrchestratorSettings::default());

    let report = orch.run(ExecuteRequest::new("Flaky"), &CancellationToken::new()).await.unwrap();
    assert_eq!(report.circuit, "HelloWorld");
    assert_eq!(report.blocked_by, Some(BlockCause::AlreadyOpen));

    let other = orch
        .run(ExecuteRequest::new("Flaky").with_circuit("Payments"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(other.circuit, "Payments");
    assert!(matches!(other.outcome, Outcome::Succeeded { .. }));
}

#[tokio::test]
async fn test_store_trait_object_is_shared() {
    let store = FaultyStore::new();
    let shared: Arc<dyn StatusStore> = store.clone();
    shared.put(CircuitStatus::new("Shared", START)).await.unwrap();
    assert_eq!(store.inner.len(), 1);
}
