//! Placeholder protected operation.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::invoke::{Invoke, InvokeError, TargetRef};

/// Answers every call with a fixed greeting, shaped like a function-URL response.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelloWorld;

impl HelloWorld {
    pub const NAME: &'static str = "HelloWorld";
}

#[async_trait]
impl Invoke for HelloWorld {
    async fn invoke(&self, target: &TargetRef, payload: &Value) -> Result<Value, InvokeError> {
        tracing::debug!(target_ref = %target, payload = %payload, "HelloWorld invoked");
        Ok(json!({
            "statusCode": 200,
            "body": "Hello, world!",
        }))
    }
}
