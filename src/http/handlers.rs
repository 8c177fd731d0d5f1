//! Request handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::orchestrator::{BlockCause, ExecuteRequest, FailureKind, Outcome, RunReport};
use crate::status::StatusView;
use crate::store::CircuitStatus;

/// Body of a finished run: the outcome contract plus run details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub circuit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<BlockCause>,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<FailureKind>,
}

impl From<RunReport> for ExecuteResponse {
    fn from(report: RunReport) -> Self {
        Self {
            outcome: report.outcome,
            circuit: report.circuit,
            blocked_by: report.blocked_by,
            attempts: report.record.attempts,
            last_error: report.record.last_error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub version: String,
    pub status: String,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "ok".to_string(),
    })
}

pub async fn execute(
    State(state): State<AppState>,
    body: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let orchestrator = state.orchestrator();
    let cancel = state.shutdown.token();

    // Detached so a dropped connection cannot abandon a run between the last
    // failed attempt and the trip write. Shutdown still cancels it.
    let run = tokio::spawn(async move { orchestrator.run(request, &cancel).await });
    let report = run.await.map_err(|e| {
        tracing::error!(error = %e, "Orchestration task aborted");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
    })??;
    Ok(Json(report.into()))
}

pub async fn get_circuit(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StatusView>, ApiError> {
    let view = state.reader().get_status(&name).await?;
    Ok(Json(view))
}

pub async fn trip_circuit(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CircuitStatus>, ApiError> {
    let ttl = state.config.load().circuit.time_to_live.as_std();
    let row = state.writer().trip_circuit(&name, ttl).await?;
    tracing::info!(circuit = %name, closes_at = row.closes_at, "Circuit tripped manually");
    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::TargetRef;
    use crate::orchestrator::AttemptRecord;
    use serde_json::json;

    #[test]
    fn test_blocked_response_shape() {
        let mut record = AttemptRecord::new(TargetRef::new("Flaky"));
        record.attempts = 3;
        record.last_error = Some(FailureKind::Timeout);
        let report = RunReport {
            circuit: "HelloWorld".into(),
            outcome: Outcome::Blocked,
            blocked_by: Some(BlockCause::Tripped { recorded: true }),
            record,
        };

        let body = serde_json::to_value(ExecuteResponse::from(report)).unwrap();
        assert_eq!(
            body,
            json!({
                "outcome": "blocked",
                "circuit": "HelloWorld",
                "blockedBy": {"cause": "tripped", "recorded": true},
                "attempts": 3,
                "lastError": "timeout"
            })
        );
    }
}
