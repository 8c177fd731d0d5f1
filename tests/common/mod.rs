//! Shared fakes for integration testing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use breaker_coordinator::clock::{Clock, MockClock};
use breaker_coordinator::invoke::{Invoke, InvokeError, TargetRef};
use breaker_coordinator::orchestrator::{Orchestrator, OrchestratorSettings};
use breaker_coordinator::status::{StatusReader, StatusWriter};
use breaker_coordinator::store::{CircuitStatus, MemoryStore, StatusStore, StoreError, StoreResult};

/// Epoch second every test clock starts at.
pub const START: u64 = 1_700_000_000;

/// One scripted reaction of the fake target.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed(Value),
    Fail,
    Invalid,
    /// Never completes; only the attempt deadline ends it.
    Hang,
}

/// Target that replays a script; the last step repeats once the script runs out.
pub struct ScriptedInvoker {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Step>,
    calls: AtomicU32,
}

impl ScriptedInvoker {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        let last = steps.last().cloned().unwrap_or(Step::Fail);
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            last: Mutex::new(last),
            calls: AtomicU32::new(0),
        })
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::new(vec![step])
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        let mut script = self.script.lock().unwrap();
        match script.pop_front() {
            Some(step) => step,
            None => self.last.lock().unwrap().clone(),
        }
    }
}

#[async_trait]
impl Invoke for ScriptedInvoker {
    async fn invoke(&self, _target: &TargetRef, _payload: &Value) -> Result<Value, InvokeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_step() {
            Step::Succeed(value) => Ok(value),
            Step::Fail => Err(InvokeError::Failed("scripted failure".into())),
            Step::Invalid => Err(InvokeError::Invalid("scripted rejection".into())),
            Step::Hang => std::future::pending().await,
        }
    }
}

/// Memory store with switchable faults that records every write.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_get: AtomicBool,
    pub hang_get: AtomicBool,
    pub fail_put: AtomicBool,
    pub puts: Mutex<Vec<CircuitStatus>>,
}

impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn puts(&self) -> Vec<CircuitStatus> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusStore for FaultyStore {
    async fn get(&self, circuit: &str) -> StoreResult<Option<CircuitStatus>> {
        if self.hang_get.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        self.inner.get(circuit).await
    }

    async fn put(&self, status: CircuitStatus) -> StoreResult<()> {
        self.puts.lock().unwrap().push(status.clone());
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        self.inner.put(status).await
    }

    async fn delete(&self, circuit: &str) -> StoreResult<bool> {
        self.inner.delete(circuit).await
    }

    async fn list(&self) -> StoreResult<Vec<CircuitStatus>> {
        self.inner.list().await
    }

    async fn sweep_expired(&self, now: u64) -> StoreResult<usize> {
        self.inner.sweep_expired(now).await
    }
}

/// Orchestrator over `store` with a one second store deadline.
pub fn orchestrator(
    store: Arc<dyn StatusStore>,
    clock: Arc<MockClock>,
    invoker: Arc<dyn Invoke>,
    settings: OrchestratorSettings,
) -> Orchestrator {
    let clock: Arc<dyn Clock> = clock;
    Orchestrator::new(
        StatusReader::new(store.clone(), clock.clone(), Duration::from_secs(1)),
        StatusWriter::new(store, clock, Duration::from_secs(1)),
        invoker,
        settings,
    )
}

pub fn mock_clock() -> Arc<MockClock> {
    Arc::new(MockClock::at_epoch_secs(START))
}

/// Serve `state` on an ephemeral port, returning its base URL and the server task.
pub async fn spawn_server(
    state: breaker_coordinator::http::AppState,
) -> (String, tokio::task::JoinHandle<Result<(), std::io::Error>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = state.shutdown.clone();
    let server = breaker_coordinator::http::HttpServer::new(state);
    let handle = tokio::spawn(server.run(listener, shutdown));
    (format!("http://{}", addr), handle)
}

/// Downstream HTTP service answering every POST with `status`, counting hits.
pub async fn spawn_backend(status: u16) -> (String, Arc<AtomicU32>) {
    use axum::{http::StatusCode, routing::post, Router};

    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/op",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let code = StatusCode::from_u16(status).unwrap();
                (code, r#"{"echo":true}"#)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}/op", addr), hits)
}
