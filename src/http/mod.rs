//! HTTP service surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, request id, tracing, timeout)
//!     → handlers.rs
//!         POST /execute              → Orchestrator::run
//!         GET  /circuits/{name}      → StatusReader::get_status
//!         POST /circuits/{name}/trip → StatusWriter::trip_circuit
//!         GET  /health
//!     → error.rs (error kind → status code + JSON body)
//! ```
//!
//! # Design Decisions
//! - Handlers build reader, writer and orchestrator from the current config snapshot
//! - A blocked run is a normal 200 response; only errors use non-2xx codes

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer, X_REQUEST_ID};
