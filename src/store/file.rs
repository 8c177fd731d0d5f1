//! Circuit table persisted as a JSON document.
//!
//! The table lives in `<data_dir>/<table_name>.json` as an array of rows.
//! Every mutation rewrites a temporary sibling file and renames it over the
//! table, so a reader (in this process or another) never sees a torn write.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::store::types::{CircuitStatus, StoreResult};
use crate::store::StatusStore;

/// File-backed status store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) the table file for `table_name` under `data_dir`.
    pub async fn open(data_dir: impl AsRef<Path>, table_name: &str) -> StoreResult<Self> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.json", table_name));
        tracing::info!(path = ?path, "File status store opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<BTreeMap<String, CircuitStatus>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        let rows: Vec<CircuitStatus> = serde_json::from_slice(&bytes)?;
        Ok(rows.into_iter().map(|r| (r.circuit.clone(), r)).collect())
    }

    async fn persist(&self, rows: &BTreeMap<String, CircuitStatus>) -> StoreResult<()> {
        let rows: Vec<&CircuitStatus> = rows.values().collect();
        let body = serde_json::to_vec_pretty(&rows)?;

        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, body).await?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl StatusStore for FileStore {
    async fn get(&self, circuit: &str) -> StoreResult<Option<CircuitStatus>> {
        Ok(self.load().await?.remove(circuit))
    }

    async fn put(&self, status: CircuitStatus) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load().await?;
        rows.insert(status.circuit.clone(), status);
        self.persist(&rows).await
    }

    async fn delete(&self, circuit: &str) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load().await?;
        let removed = rows.remove(circuit).is_some();
        if removed {
            self.persist(&rows).await?;
        }
        Ok(removed)
    }

    async fn list(&self) -> StoreResult<Vec<CircuitStatus>> {
        Ok(self.load().await?.into_values().collect())
    }

    async fn sweep_expired(&self, now: u64) -> StoreResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load().await?;
        let before = rows.len();
        rows.retain(|_, row| !row.is_closed_at(now));
        let removed = before - rows.len();
        if removed > 0 {
            self.persist(&rows).await?;
        }
        Ok(removed)
    }
}
