//! Circuit status subsystem.
//!
//! # Data Flow
//! ```text
//! CHECKING  → reader.rs → StatusStore::get → isClosed = no row || now >= closesAt
//! TRIPPING  → writer.rs → StatusStore::put(circuit, ceil(now + ttl))
//! ```
//!
//! # Design Decisions
//! - The reader never writes; recovery is computed from time alone
//! - Store failures surface as errors; neither side guesses a verdict

pub mod reader;
pub mod writer;

use thiserror::Error;

use crate::store::StoreError;

pub use reader::{StatusReader, StatusView};
pub use writer::StatusWriter;

/// Errors from the status reader and writer.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("circuit name must not be empty")]
    EmptyCircuitName,

    #[error("cooldown must be a positive duration")]
    InvalidTtl,

    #[error(transparent)]
    Store(#[from] StoreError),
}
