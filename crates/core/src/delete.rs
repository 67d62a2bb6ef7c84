//! Recursive delete of a local directory tree or a remote key prefix

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::{RemotePath, StoragePath, classify};
use crate::traits::{Connector, ListOptions, ObjectStore};

/// Upper bound of a single DeleteObjects request and of one listing page
pub const MAX_DELETE_BATCH: usize = 1000;

/// What a successful delete did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Objects under a remote prefix were removed (possibly zero)
    Remote { target: String, deleted: usize },
    /// A local path and everything below it was removed
    LocalRemoved { path: PathBuf },
    /// Nothing existed at the local path
    LocalMissing { path: PathBuf },
}

/// Delete everything under `destination`.
///
/// Local paths that do not exist are reported as [`DeleteOutcome::LocalMissing`],
/// which keeps repeated cleanups safe.
pub async fn delete_recursive(
    destination: &str,
    connector: &dyn Connector,
) -> Result<DeleteOutcome> {
    match classify(destination) {
        StoragePath::Remote(remote) => {
            let store = connector.connect().await?;
            let deleted = delete_prefix(store.as_ref(), &remote).await?;
            Ok(DeleteOutcome::Remote {
                target: remote.to_string(),
                deleted,
            })
        }
        StoragePath::Local(path) => delete_local(&path).await,
    }
}

/// Delete every object under a remote prefix, page by page
async fn delete_prefix(store: &dyn ObjectStore, remote: &RemotePath) -> Result<usize> {
    let mut deleted = 0;
    let mut continuation_token: Option<String> = None;

    loop {
        let options = ListOptions {
            max_keys: Some(MAX_DELETE_BATCH as i32),
            continuation_token: continuation_token.take(),
        };

        let page = store.list_objects(remote, options).await?;
        let keys: Vec<String> = page.items.into_iter().map(|item| item.key).collect();
        tracing::debug!(
            bucket = %remote.bucket,
            prefix = %remote.key,
            keys = keys.len(),
            "listed page"
        );

        for chunk in keys.chunks(MAX_DELETE_BATCH) {
            let removed = store.delete_objects(&remote.bucket, chunk.to_vec()).await?;
            tracing::debug!(requested = chunk.len(), removed = removed.len(), "deleted batch");
            deleted += removed.len();
        }

        match page.continuation_token {
            Some(token) if page.truncated => continuation_token = Some(token),
            _ => break,
        }
    }

    tracing::info!(location = %remote, deleted, "remote prefix removed");
    Ok(deleted)
}

async fn delete_local(path: &Path) -> Result<DeleteOutcome> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "nothing to delete");
            return Ok(DeleteOutcome::LocalMissing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(Error::Io(e)),
    };

    if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await?;
    } else {
        tokio::fs::remove_file(path).await?;
    }

    tracing::info!(path = %path.display(), "local path removed");
    Ok(DeleteOutcome::LocalRemoved {
        path: path.to_path_buf(),
    })
}
