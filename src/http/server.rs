//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request id, tracing, timeout outside `/execute`)
//! - Serve until shutdown, then drain

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::SharedConfig;
use crate::http::handlers;
use crate::invoke::Invoke;
use crate::lifecycle::Shutdown;
use crate::orchestrator::{Orchestrator, OrchestratorSettings};
use crate::status::{StatusReader, StatusWriter};
use crate::store::StatusStore;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: SharedConfig,
    pub store: Arc<dyn StatusStore>,
    pub clock: Arc<dyn Clock>,
    pub invoker: Arc<dyn Invoke>,
    pub shutdown: Shutdown,
}

impl AppState {
    pub fn reader(&self) -> StatusReader {
        let timeout = self.config.load().store.timeout();
        StatusReader::new(self.store.clone(), self.clock.clone(), timeout)
    }

    pub fn writer(&self) -> StatusWriter {
        let timeout = self.config.load().store.timeout();
        StatusWriter::new(self.store.clone(), self.clock.clone(), timeout)
    }

    /// Orchestrator bound to the configuration as it is right now.
    pub fn orchestrator(&self) -> Orchestrator {
        let config = self.config.load();
        let timeout = config.store.timeout();
        Orchestrator::new(
            StatusReader::new(self.store.clone(), self.clock.clone(), timeout),
            StatusWriter::new(self.store.clone(), self.clock.clone(), timeout),
            self.invoker.clone(),
            OrchestratorSettings::from(&**config),
        )
    }
}

/// Request ids are random UUID v4 strings.
#[derive(Debug, Clone, Copy, Default)]
struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// HTTP server for the coordinator.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let request_timeout = Duration::from_secs(state.config.load().listener.request_timeout_secs);
        let router = Self::build_router(state, request_timeout);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), RequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }));

        // Runs carry their own attempt, backoff and store deadlines. Cutting
        // one off here would skip the trip write.
        let bounded = Router::new()
            .route("/health", get(handlers::health))
            .route("/circuits/{name}", get(handlers::get_circuit))
            .route("/circuits/{name}/trip", post(handlers::trip_circuit))
            .layer(TimeoutLayer::new(request_timeout));

        Router::new()
            .route("/execute", post(handlers::execute))
            .merge(bounded)
            .with_state(state)
            .layer(middleware)
    }

    /// The router, for serving on a caller-owned listener.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve on `listener` until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.triggered().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
