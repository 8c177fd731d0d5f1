//! Distributed circuit-breaker coordinator library.

pub mod clock;
pub mod config;
pub mod http;
pub mod invoke;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod resilience;
pub mod status;
pub mod store;

pub use config::schema::CoordinatorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use orchestrator::{ExecuteRequest, Orchestrator, Outcome};
