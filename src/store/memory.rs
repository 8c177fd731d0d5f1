//! In-process circuit table.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::store::types::{CircuitStatus, StoreResult};
use crate::store::StatusStore;

/// A thread-safe table of circuit rows keyed by circuit name.
///
/// Clones share the same table. Upserts replace the whole row under the
/// shard lock, so concurrent readers see either the old or the new row.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, CircuitStatus>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn get(&self, circuit: &str) -> StoreResult<Option<CircuitStatus>> {
        Ok(self.inner.get(circuit).map(|r| r.value().clone()))
    }

    async fn put(&self, status: CircuitStatus) -> StoreResult<()> {
        self.inner.insert(status.circuit.clone(), status);
        Ok(())
    }

    async fn delete(&self, circuit: &str) -> StoreResult<bool> {
        Ok(self.inner.remove(circuit).is_some())
    }

    async fn list(&self) -> StoreResult<Vec<CircuitStatus>> {
        let mut rows: Vec<_> = self.inner.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|a, b| a.circuit.cmp(&b.circuit));
        Ok(rows)
    }

    async fn sweep_expired(&self, now: u64) -> StoreResult<usize> {
        let before = self.inner.len();
        self.inner.retain(|_, row| !row.is_closed_at(now));
        Ok(before.saturating_sub(self.inner.len()))
    }
}
