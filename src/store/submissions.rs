use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::sync::Mutex;

use crate::domain::{Submission, Verdict};

use super::{write_atomic, StoreError};

/// Ordered submission records persisted as one JSON array.
///
/// Every mutation rewrites the whole document. Reads and read-modify-write
/// cycles are serialised through one async mutex, so an append racing with
/// `mark_processed` cannot lose either update.
#[derive(Debug)]
pub struct SubmissionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SubmissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty array if the document does not exist yet.
    /// Returns whether a document was created.
    pub async fn ensure_initialized(&self) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => Ok(false),
            Ok(false) => {
                write_atomic(&self.path, b"[]").await?;
                tracing::info!(target: "store", path = %self.path.display(), "initialised empty submission store");
                Ok(true)
            }
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }

    pub async fn load_all(&self) -> Result<Vec<Submission>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_document().await
    }

    /// Appends one record and returns its index.
    pub async fn append(&self, submission: Submission) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_document().await?;
        records.push(submission);
        self.write_document(&records).await?;
        let index = records.len() - 1;
        tracing::debug!(target: "store", index, "submission appended");
        Ok(index)
    }

    /// Re-reads the document, flags the record at `index` and rewrites it.
    pub async fn mark_processed(&self, index: usize, verdict: Verdict) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_document().await?;
        let len = records.len();
        let record = records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        record.mark_processed(verdict);
        self.write_document(&records).await
    }

    async fn read_document(&self) -> Result<Vec<Submission>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };
        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_document(&self, records: &[Submission]) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(records).map_err(StoreError::Serialize)?;
        write_atomic(&self.path, &payload).await
    }
}
