//! Metrics collection and exposition.
//!
//! # Metrics
//! - `breaker_runs_total` (counter): finished runs by outcome or error kind
//! - `breaker_run_duration_seconds` (histogram): wall time of a run
//! - `breaker_attempts_total` (counter): invocations by target and result
//! - `breaker_trips_total` (counter): trips by circuit and whether the write landed
//! - `breaker_status_reads_total` (counter): status reads by circuit and verdict
//! - `breaker_store_errors_total` (counter): failed store calls by operation
//! - `breaker_expired_swept_total` (counter): rows removed by the expiry sweep

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_run(outcome: &'static str, elapsed: Duration) {
    ::metrics::counter!("breaker_runs_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("breaker_run_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}

pub fn record_attempt(target: &str, result: &'static str) {
    ::metrics::counter!(
        "breaker_attempts_total",
        "target" => target.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_trip(circuit: &str, recorded: bool) {
    ::metrics::counter!(
        "breaker_trips_total",
        "circuit" => circuit.to_string(),
        "recorded" => if recorded { "true" } else { "false" }
    )
    .increment(1);
}

pub fn record_status_read(circuit: &str, closed: bool) {
    ::metrics::counter!(
        "breaker_status_reads_total",
        "circuit" => circuit.to_string(),
        "closed" => if closed { "true" } else { "false" }
    )
    .increment(1);
}

pub fn record_store_error(operation: &'static str) {
    ::metrics::counter!("breaker_store_errors_total", "operation" => operation).increment(1);
}

pub fn record_swept(removed: usize) {
    ::metrics::counter!("breaker_expired_swept_total").increment(removed as u64);
}
