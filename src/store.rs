use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

use crate::models::VisitorRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed visitor log: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Append-only visitor log persisted as a single pretty-printed JSON array.
///
/// Every append rewrites the whole file. The internal lock is held across the
/// read-modify-write so concurrent appends cannot drop each other's records.
#[derive(Clone)]
pub struct VisitorStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl VisitorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: VisitorRecord) -> Result<(), StoreError> {
        self.append_with(|| record).await.map(|_| ())
    }

    /// Append the record built by `make`, which runs while the lock is held so
    /// timestamps taken inside it follow append order. Existing entries are
    /// carried over as raw JSON and written back unchanged.
    pub async fn append_with<F>(&self, make: F) -> Result<VisitorRecord, StoreError>
    where
        F: FnOnce() -> VisitorRecord,
    {
        let _guard = self.lock.lock().await;

        let mut entries: Vec<Value> = self.load().await?;
        let record = make();
        entries.push(serde_json::to_value(&record)?);

        let json = serde_json::to_string_pretty(&entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        tracing::debug!(count = entries.len(), "visitor log rewritten");
        Ok(record)
    }

    pub async fn list_all(&self) -> Result<Vec<VisitorRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
