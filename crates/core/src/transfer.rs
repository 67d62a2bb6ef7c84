//! Single-file transfer from local disk to a local or remote destination

use std::fs::{FileTimes, Metadata};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::{StoragePath, classify};
use crate::traits::Connector;

/// What a successful transfer did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub source: PathBuf,
    /// Final destination, after directory-style destinations got the file name
    pub destination: String,
    pub size_bytes: u64,
}

/// Copy one local file to `destination`, overwriting whatever is there.
///
/// The source is checked before anything else; a missing source never
/// resolves credentials or touches the destination.
pub async fn transfer_file(
    source: &str,
    destination: &str,
    connector: &dyn Connector,
) -> Result<TransferOutcome> {
    let source_path = Path::new(source);
    let metadata = match tokio::fs::metadata(source_path).await {
        Ok(m) if m.is_file() => m,
        _ => {
            return Err(Error::NotFound(format!(
                "source file '{source}' does not exist or is not a file"
            )));
        }
    };
    let file_name = source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match classify(destination) {
        StoragePath::Remote(remote) => {
            let target = if remote.is_dir() {
                remote.join(&file_name)
            } else {
                remote
            };

            let store = connector.connect().await?;
            store.put_file(&target, source_path).await?;

            tracing::info!(source, destination = %target, "file uploaded");
            Ok(TransferOutcome {
                source: source_path.to_path_buf(),
                destination: target.to_string(),
                size_bytes: metadata.len(),
            })
        }
        StoragePath::Local(path) => {
            let into_dir = ends_with_separator(destination) || is_dir(&path).await;
            let target = if into_dir { path.join(&file_name) } else { path };

            if let Ok(existing) = tokio::fs::metadata(&target).await {
                if is_same_file(source_path, &metadata, &target, &existing).await {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!(
                            "source and destination are the same file: {}",
                            target.display()
                        ),
                    )));
                }
            }

            let size_bytes = copy_local(source_path, &metadata, &target).await?;

            tracing::info!(source, destination = %target.display(), "file copied");
            Ok(TransferOutcome {
                source: source_path.to_path_buf(),
                destination: target.display().to_string(),
                size_bytes,
            })
        }
    }
}

fn ends_with_separator(path: &str) -> bool {
    path.ends_with('/') || path.ends_with(std::path::MAIN_SEPARATOR)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

#[cfg(unix)]
async fn is_same_file(_: &Path, source: &Metadata, _: &Path, target: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    source.dev() == target.dev() && source.ino() == target.ino()
}

#[cfg(not(unix))]
async fn is_same_file(source: &Path, _: &Metadata, target: &Path, _: &Metadata) -> bool {
    match (
        tokio::fs::canonicalize(source).await,
        tokio::fs::canonicalize(target).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

async fn copy_local(source: &Path, metadata: &Metadata, target: &Path) -> Result<u64> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Copies permission bits as well as content.
    let size = tokio::fs::copy(source, target).await?;
    preserve_times(metadata, target).await?;
    Ok(size)
}

/// Carry the source's access and modification times over to `target`
async fn preserve_times(metadata: &Metadata, target: &Path) -> Result<()> {
    let modified = metadata
        .modified()
        .map_err(|e| timestamps_error(target, e))?;
    let mut times = FileTimes::new().set_modified(modified);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    let path = target.to_path_buf();
    tokio::task::spawn_blocking(move || open_for_times(&path)?.set_times(times))
        .await
        .map_err(std::io::Error::other)
        .and_then(|result| result)
        .map_err(|e| timestamps_error(target, e))
}

/// The content is already in place when this is reported.
fn timestamps_error(target: &Path, err: std::io::Error) -> Error {
    Error::Io(std::io::Error::new(
        err.kind(),
        format!(
            "{} was copied but its timestamps could not be set: {err}",
            target.display()
        ),
    ))
}

#[cfg(unix)]
fn open_for_times(path: &Path) -> std::io::Result<std::fs::File> {
    // The owner may set timestamps through a read-only handle.
    std::fs::File::open(path)
}

#[cfg(not(unix))]
fn open_for_times(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new().write(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::RemotePath;
    use crate::traits::{MockConnector, MockObjectStore, ObjectInfo, ObjectStore};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write_source(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_source_never_connects() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.tar");

        let mut connector = MockConnector::new();
        connector.expect_connect().never();

        let err = transfer_file(
            missing.to_str().unwrap(),
            "s3://bucket/exports/image.tar",
            &connector,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_directory_source_rejected() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.bin");

        let connector = MockConnector::new();
        let err = transfer_file(
            temp.path().to_str().unwrap(),
            dest.to_str().unwrap(),
            &connector,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_local_copy_creates_parents_and_keeps_mtime() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "image.tar", b"layer data \x00\x01\x02");
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        std::fs::File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(mtime)
            .unwrap();

        let dest = temp.path().join("nested/deeper/copy.tar");
        let mut connector = MockConnector::new();
        connector.expect_connect().never();

        let outcome = transfer_file(
            source.to_str().unwrap(),
            dest.to_str().unwrap(),
            &connector,
        )
        .await
        .unwrap();

        assert_eq!(outcome.size_bytes, 14);
        assert_eq!(outcome.destination, dest.display().to_string());
        assert_eq!(std::fs::read(&dest).unwrap(), b"layer data \x00\x01\x02");
        assert_eq!(std::fs::metadata(&dest).unwrap().modified().unwrap(), mtime);
    }

    #[tokio::test]
    async fn test_local_copy_overwrites_existing_file() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "new.txt", b"new");
        let dest = write_source(temp.path(), "old.txt", b"old contents");

        let connector = MockConnector::new();
        transfer_file(source.to_str().unwrap(), dest.to_str().unwrap(), &connector)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_local_copy_into_existing_directory() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "image.tar", b"data");
        let out_dir = temp.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();

        let connector = MockConnector::new();
        let outcome = transfer_file(
            source.to_str().unwrap(),
            out_dir.to_str().unwrap(),
            &connector,
        )
        .await
        .unwrap();

        let expected = out_dir.join("image.tar");
        assert_eq!(outcome.destination, expected.display().to_string());
        assert_eq!(std::fs::read(expected).unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_copy_onto_itself_via_directory_is_rejected() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "image.tar", b"precious layer data");

        let connector = MockConnector::new();
        let err = transfer_file(
            source.to_str().unwrap(),
            temp.path().to_str().unwrap(),
            &connector,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("same file"));
        assert_eq!(std::fs::read(&source).unwrap(), b"precious layer data");
    }

    #[tokio::test]
    async fn test_copy_onto_itself_by_path_is_rejected() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "image.tar", b"precious layer data");
        let same = temp.path().join(".").join("image.tar");

        let connector = MockConnector::new();
        let err = transfer_file(source.to_str().unwrap(), same.to_str().unwrap(), &connector)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("same file"));
        assert_eq!(std::fs::read(&source).unwrap(), b"precious layer data");
    }

    #[test]
    fn test_timestamp_failure_says_content_was_copied() {
        let err = timestamps_error(
            Path::new("/out/image.tar"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        let Error::Io(io) = &err else {
            panic!("expected an IO error, got {err:?}");
        };
        assert_eq!(io.kind(), std::io::ErrorKind::PermissionDenied);
        assert!(
            err.to_string()
                .contains("/out/image.tar was copied but its timestamps could not be set")
        );
    }

    #[tokio::test]
    async fn test_remote_upload_uses_key() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "image.tar", b"abc");
        let expected_source = source.clone();

        let mut store = MockObjectStore::new();
        store
            .expect_put_file()
            .withf(move |path, src| {
                path == &RemotePath::new("bucket", "exports/image.tar") && src == expected_source
            })
            .times(1)
            .returning(|path, _| Ok(ObjectInfo::file(&path.key, 3)));

        let mut connector = MockConnector::new();
        let mut store = Some(store);
        connector
            .expect_connect()
            .times(1)
            .returning(move || Ok(Box::new(store.take().unwrap()) as Box<dyn ObjectStore>));

        let outcome = transfer_file(
            source.to_str().unwrap(),
            "s3://bucket/exports/image.tar",
            &connector,
        )
        .await
        .unwrap();
        assert_eq!(outcome.destination, "s3://bucket/exports/image.tar");
        assert_eq!(outcome.size_bytes, 3);
    }

    #[tokio::test]
    async fn test_remote_prefix_destination_appends_file_name() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "image.tar", b"abc");

        let mut store = MockObjectStore::new();
        store
            .expect_put_file()
            .withf(|path, _| path.key == "exports/image.tar")
            .times(1)
            .returning(|path, _| Ok(ObjectInfo::file(&path.key, 3)));

        let mut connector = MockConnector::new();
        let mut store = Some(store);
        connector
            .expect_connect()
            .returning(move || Ok(Box::new(store.take().unwrap()) as Box<dyn ObjectStore>));

        let outcome = transfer_file(source.to_str().unwrap(), "s3://bucket/exports/", &connector)
            .await
            .unwrap();
        assert_eq!(outcome.destination, "s3://bucket/exports/image.tar");
    }

    #[tokio::test]
    async fn test_upload_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "image.tar", b"abc");

        let mut store = MockObjectStore::new();
        store
            .expect_put_file()
            .returning(|_, _| Err(Error::Remote("SlowDown".into())));

        let mut connector = MockConnector::new();
        let mut store = Some(store);
        connector
            .expect_connect()
            .returning(move || Ok(Box::new(store.take().unwrap()) as Box<dyn ObjectStore>));

        let err = transfer_file(source.to_str().unwrap(), "s3://bucket/key", &connector)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SlowDown"));
    }
}
