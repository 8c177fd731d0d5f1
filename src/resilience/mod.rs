//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt of the protected operation:
//!     → timeouts.rs (enforce the per-attempt deadline)
//!     → On failure or timeout: retries.rs (budget check, next delay)
//!     → backoff.rs (exponential schedule, optional jitter)
//!
//! Store operation:
//!     → timeouts.rs (separate, shorter deadline)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retry parameters are configuration, never constants
//! - Backoff waits are plain Tokio sleeps so cancellation interrupts them

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
pub use timeouts::{store_call, with_timeout, Elapsed};
