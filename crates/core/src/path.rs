//! Path classification
//!
//! A path is remote when it starts with `s3://`; the rest is split on the
//! first `/` into bucket and key. Every other string is a local path and is
//! passed through untouched.

use std::path::PathBuf;

/// Scheme prefix marking an object-store location
pub const S3_SCHEME: &str = "s3://";

/// A remote location in an S3-compatible store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    /// Bucket name
    pub bucket: String,
    /// Object key or key prefix (empty for bucket root)
    pub key: String,
}

impl RemotePath {
    /// Create a new RemotePath
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether the key names a "directory" rather than a single object
    pub fn is_dir(&self) -> bool {
        self.key.is_empty() || self.key.ends_with('/')
    }

    /// Get the full path as a string (s3://bucket/key)
    pub fn to_full_path(&self) -> String {
        if self.key.is_empty() {
            format!("{S3_SCHEME}{}", self.bucket)
        } else {
            format!("{S3_SCHEME}{}/{}", self.bucket, self.key)
        }
    }

    /// Join a child path component onto the key
    pub fn join(&self, child: &str) -> Self {
        let base = self.key.trim_end_matches('/');
        let key = if base.is_empty() {
            child.to_string()
        } else {
            format!("{base}/{child}")
        };
        Self {
            bucket: self.bucket.clone(),
            key,
        }
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_full_path())
    }
}

/// Classified path: local filesystem or object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoragePath {
    /// Local filesystem path
    Local(PathBuf),
    /// Remote S3 path
    Remote(RemotePath),
}

impl StoragePath {
    /// Check if this is a remote path
    pub fn is_remote(&self) -> bool {
        matches!(self, StoragePath::Remote(_))
    }

    /// Check if this is a local path
    pub fn is_local(&self) -> bool {
        matches!(self, StoragePath::Local(_))
    }

    /// Get the remote path if this is a remote path
    pub fn as_remote(&self) -> Option<&RemotePath> {
        match self {
            StoragePath::Remote(p) => Some(p),
            StoragePath::Local(_) => None,
        }
    }

    /// Get the local path if this is a local path
    pub fn as_local(&self) -> Option<&PathBuf> {
        match self {
            StoragePath::Local(p) => Some(p),
            StoragePath::Remote(_) => None,
        }
    }
}

/// Check whether a raw path string targets the object store
pub fn is_remote(path: &str) -> bool {
    path.starts_with(S3_SCHEME)
}

/// Classify a path string. Never fails.
pub fn classify(path: &str) -> StoragePath {
    match path.strip_prefix(S3_SCHEME) {
        Some(rest) => {
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            StoragePath::Remote(RemotePath::new(bucket, key))
        }
        None => StoragePath::Local(PathBuf::from(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_remote_with_key() {
        let path = classify("s3://bucket/a/b");
        assert!(path.is_remote());

        let remote = path.as_remote().unwrap();
        assert_eq!(remote.bucket, "bucket");
        assert_eq!(remote.key, "a/b");
        assert!(!remote.is_dir());
    }

    #[test]
    fn test_classify_bucket_only() {
        let path = classify("s3://bucket");
        assert_eq!(path, StoragePath::Remote(RemotePath::new("bucket", "")));
        assert!(path.as_remote().unwrap().is_dir());
    }

    #[test]
    fn test_classify_splits_on_first_slash_only() {
        let remote = classify("s3://b/x/y/").as_remote().cloned().unwrap();
        assert_eq!(remote.bucket, "b");
        assert_eq!(remote.key, "x/y/");
        assert!(remote.is_dir());
    }

    #[test]
    fn test_classify_local_is_identity() {
        for raw in [
            "/home/user/file.txt",
            "./relative",
            "../up/one",
            "plain.txt",
            "",
            "S3://upper/case",
            "s3:/missing-slash",
            "http://bucket/key",
        ] {
            let path = classify(raw);
            assert!(path.is_local(), "{raw} should be local");
            assert_eq!(path.as_local().unwrap().to_str().unwrap(), raw);
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("s3://bucket"));
        assert!(!is_remote("/tmp/s3://bucket"));
    }

    #[test]
    fn test_remote_path_join() {
        let path = RemotePath::new("bucket", "");
        assert_eq!(path.join("file.txt").key, "file.txt");

        let path = RemotePath::new("bucket", "dir/");
        assert_eq!(path.join("file.txt").key, "dir/file.txt");
    }

    #[test]
    fn test_remote_path_display() {
        assert_eq!(
            RemotePath::new("bucket", "key/file.txt").to_string(),
            "s3://bucket/key/file.txt"
        );
        assert_eq!(RemotePath::new("bucket", "").to_string(), "s3://bucket");
    }
}
