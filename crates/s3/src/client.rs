//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from objmove-core.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};

use objmove_core::{Error, ListOptions, ListResult, ObjectInfo, ObjectStore, RemotePath, Result};

/// S3 client wrapper
#[derive(Debug, Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a client from a fully built S3 service configuration
    pub fn from_conf(config: aws_sdk_s3::Config) -> Self {
        Self {
            inner: aws_sdk_s3::Client::from_conf(config),
        }
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }
}

fn remote_error(
    action: &str,
    target: impl std::fmt::Display,
    err: impl std::error::Error,
) -> Error {
    Error::Remote(format!("{action} {target}: {}", DisplayErrorContext(err)))
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(&self, path: &RemotePath, options: ListOptions) -> Result<ListResult> {
        let mut request = self.inner.list_objects_v2().bucket(&path.bucket);

        if !path.key.is_empty() {
            request = request.prefix(&path.key);
        }

        if let Some(max) = options.max_keys {
            request = request.max_keys(max);
        }

        if let Some(token) = &options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| remote_error("listing", path, e))?;

        let items = response
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                let mut info = ObjectInfo::file(key, object.size().unwrap_or(0));
                if let Some(modified) = object.last_modified() {
                    info.last_modified = jiff::Timestamp::from_second(modified.secs()).ok();
                }
                if let Some(etag) = object.e_tag() {
                    info.etag = Some(etag.trim_matches('"').to_string());
                }
                Some(info)
            })
            .collect();

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let objects = keys
            .iter()
            .map(|k| ObjectIdentifier::builder().key(k).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Remote(e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|e| Error::Remote(e.to_string()))?;

        let response = self
            .inner
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| remote_error("deleting from bucket", bucket, e))?;

        let errors = response.errors();
        if let Some(first) = errors.first() {
            for failed in errors {
                tracing::warn!(
                    key = failed.key().unwrap_or_default(),
                    code = failed.code().unwrap_or_default(),
                    "object not deleted"
                );
            }
            return Err(Error::Remote(format!(
                "{} of {} objects in bucket {bucket} could not be deleted (first: {}: {})",
                errors.len(),
                keys.len(),
                first.key().unwrap_or_default(),
                first
                    .message()
                    .or(first.code())
                    .unwrap_or("unknown error"),
            )));
        }

        Ok(response
            .deleted()
            .iter()
            .filter_map(|d| d.key().map(|k| k.to_string()))
            .collect())
    }

    async fn put_file(&self, path: &RemotePath, source: &Path) -> Result<ObjectInfo> {
        let size = tokio::fs::metadata(source).await?.len();
        let body = ByteStream::from_path(source)
            .await
            .map_err(std::io::Error::other)?;

        let mut request = self
            .inner
            .put_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .content_length(size as i64)
            .body(body);

        if let Some(content_type) = mime_guess::from_path(source).first() {
            request = request.content_type(content_type.essence_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| remote_error("uploading to", path, e))?;

        let mut info = ObjectInfo::file(&path.key, size as i64);
        if let Some(etag) = response.e_tag() {
            info.etag = Some(etag.trim_matches('"').to_string());
        }
        info.last_modified = Some(jiff::Timestamp::now());

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    fn offline_client() -> S3Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
            .endpoint_url("http://127.0.0.1:9")
            .force_path_style(true)
            .build();
        S3Client::from_conf(config)
    }

    #[tokio::test]
    async fn test_delete_nothing_sends_no_request() {
        let deleted = offline_client()
            .delete_objects("bucket", vec![])
            .await
            .unwrap();
        assert!(deleted.is_empty());
    }

    #[tokio::test]
    async fn test_put_missing_file_is_io_error() {
        let err = offline_client()
            .put_file(
                &RemotePath::new("bucket", "key"),
                Path::new("/definitely/not/here.bin"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
