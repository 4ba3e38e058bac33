use std::{io::ErrorKind, path::Path};

use crate::domain::{lists::DomainListDocument, DomainList, DomainLists};

use super::{write_atomic, StoreError};

const EMPTY_LIST_DOCUMENT: &[u8] = br#"{"domains":[]}"#;

/// Creates `{"domains":[]}` at `path` if nothing is there yet.
pub async fn ensure_list_document(path: &Path) -> Result<bool, StoreError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(false),
        Ok(false) => {
            write_atomic(path, EMPTY_LIST_DOCUMENT).await?;
            tracing::info!(target: "store", path = %path.display(), "initialised empty domain list");
            Ok(true)
        }
        Err(err) => Err(StoreError::io(path, err)),
    }
}

pub async fn load_list(path: &Path) -> Result<DomainList, StoreError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(DomainList::default()),
        Err(err) => return Err(StoreError::io(path, err)),
    };
    let document: DomainListDocument =
        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(document.into())
}

pub async fn load_domain_lists(
    allowlist_path: &Path,
    blocklist_path: &Path,
) -> Result<DomainLists, StoreError> {
    let allowlist = load_list(allowlist_path).await?;
    let blocklist = load_list(blocklist_path).await?;
    tracing::info!(
        target: "store",
        allowlist = allowlist.len(),
        blocklist = blocklist.len(),
        "domain lists loaded"
    );
    Ok(DomainLists::new(allowlist, blocklist))
}
