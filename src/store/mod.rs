use std::{io, path::PathBuf};

use thiserror::Error;

pub mod lists;
pub mod submissions;

pub use lists::{ensure_list_document, load_domain_lists, load_list};
pub use submissions::SubmissionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("document {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialise document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("no submission at index {index} (store holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }

    fn io(path: &std::path::Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Replaces `path` with `contents` via a sibling temp file and a rename.
async fn write_atomic(path: &std::path::Path, contents: &[u8]) -> Result<(), StoreError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|err| StoreError::io(&tmp, err))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|err| StoreError::io(path, err))
}
