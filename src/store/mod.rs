//! Status store subsystem.
//!
//! # Data Flow
//! ```text
//! Status Writer (trip)
//!     → StatusStore::put (single atomic upsert, last writer wins)
//!
//! Status Reader (check)
//!     → StatusStore::get → compare closesAt with now
//!
//! ExpirySweeper (sweeper.rs)
//!     → StatusStore::sweep_expired (physical deletion, best effort)
//! ```
//!
//! # Design Decisions
//! - One row per circuit: `(circuit, closesAt)`; no row means closed
//! - Rows are never rewritten to mark a circuit closed; closing is temporal
//! - Deletion timing is never part of correctness

pub mod file;
pub mod memory;
pub mod sweeper;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StoreBackend, StoreConfig};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sweeper::ExpirySweeper;
pub use types::{CircuitStatus, StoreError, StoreResult};

/// Durable table of circuit rows.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Fetch the row for `circuit`, if any.
    async fn get(&self, circuit: &str) -> StoreResult<Option<CircuitStatus>>;

    /// Insert or replace the row for `status.circuit`.
    async fn put(&self, status: CircuitStatus) -> StoreResult<()>;

    /// Remove the row for `circuit`, returning whether one existed.
    async fn delete(&self, circuit: &str) -> StoreResult<bool>;

    /// All rows, ordered by circuit name.
    async fn list(&self) -> StoreResult<Vec<CircuitStatus>>;

    /// Delete every row whose `closesAt` is at or before `now`.
    async fn sweep_expired(&self, now: u64) -> StoreResult<usize>;
}

/// Build the store selected by configuration.
pub async fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn StatusStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!(table = %config.table_name, "Using in-memory status store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::File => {
            let store = FileStore::open(&config.data_dir, &config.table_name).await?;
            Ok(Arc::new(store))
        }
    }
}
