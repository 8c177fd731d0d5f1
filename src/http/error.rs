//! Mapping of service errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::orchestrator::OrchestrationError;
use crate::status::StatusError;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<OrchestrationError> for ApiError {
    fn from(err: OrchestrationError) -> Self {
        let status = match &err {
            OrchestrationError::InvalidRequest(_) | OrchestrationError::OperationInvalid { .. } => {
                StatusCode::BAD_REQUEST
            }
            OrchestrationError::StoreUnavailable { .. } | OrchestrationError::Cancelled => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            OrchestrationError::InvalidTransition(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.kind(), err.to_string())
    }
}

impl From<StatusError> for ApiError {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::EmptyCircuitName | StatusError::InvalidTtl => Self::bad_request(err.to_string()),
            StatusError::Store(_) => Self::new(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
