//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap store calls and target invocations with a deadline
//! - Cancel the wrapped future cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use crate::store::{StoreError, StoreResult};

/// Marker returned when a deadline elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

/// Run `fut` with a deadline; the future is dropped when the deadline passes.
pub async fn with_timeout<F, T>(limit: Duration, fut: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut).await.map_err(|_| Elapsed(limit))
}

/// Run a store operation with its deadline, folding a timeout into [`StoreError`].
pub async fn store_call<F, T>(operation: &'static str, limit: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match with_timeout(limit, fut).await {
        Ok(result) => result,
        Err(Elapsed(limit)) => Err(StoreError::Timeout {
            operation,
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}
