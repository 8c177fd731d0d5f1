//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → broadcast to background loops (sweeper, watcher)
//!             → cancel token seen by in-flight orchestration runs
//!             → HTTP server stops accepting and drains
//! ```
//!
//! # Design Decisions
//! - Background loops listen on a broadcast receiver
//! - Runs listen on a child cancellation token so a cancelled run cannot stop others

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
