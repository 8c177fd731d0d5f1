//! Remote targets reached over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::invoke::{Invoke, InvokeError, TargetRef};

/// POSTs the payload as JSON and returns the JSON (or text) response.
///
/// Connection errors, 5xx, 408 and 429 are retryable failures. Any other
/// 4xx means the request itself is wrong and is reported as invalid.
#[derive(Debug, Clone)]
pub struct HttpTarget {
    client: reqwest::Client,
    url: Url,
    timeout: Option<Duration>,
}

impl HttpTarget {
    pub fn new(client: reqwest::Client, url: Url, timeout: Option<Duration>) -> Self {
        Self { client, url, timeout }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn classify_status(status: StatusCode, message: String) -> Option<InvokeError> {
    if status.is_success() {
        None
    } else if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        Some(InvokeError::Failed(message))
    } else {
        Some(InvokeError::Invalid(message))
    }
}

#[async_trait]
impl Invoke for HttpTarget {
    async fn invoke(&self, target: &TargetRef, payload: &Value) -> Result<Value, InvokeError> {
        let mut request = self.client.post(self.url.clone()).json(payload);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                InvokeError::Invalid(e.to_string())
            } else {
                InvokeError::Failed(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InvokeError::Failed(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(target_ref = %target, status = %status, "Target returned an error status");
        }
        if let Some(err) = classify_status(status, format!("{} returned {}: {}", self.url, status, body)) {
            return Err(err);
        }

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}
