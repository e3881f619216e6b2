//! Where uploaded resumes are written. Local disk by default, S3/MinIO when
//! configured.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::config::S3Settings;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("S3 upload failed: {0}")]
    S3(String),
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores `content` under `file_name` and returns the path clients should
    /// reference it by.
    async fn put(
        &self,
        file_name: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<String, StorageError>;
}

/// Stored name for an upload: `<unix millis>-<original name>`, with the
/// original reduced to a safe basename.
pub fn stored_file_name(original: &str) -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), sanitize_file_name(original))
}

fn sanitize_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Local disk
// ────────────────────────────────────────────────────────────────────────────

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalFileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(
        &self,
        file_name: &str,
        _content_type: &str,
        content: Bytes,
    ) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(file_name);
        tokio::fs::write(&path, &content).await?;

        info!("Stored upload at {} ({} bytes)", path.display(), content.len());
        Ok(path.to_string_lossy().into_owned())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 / MinIO
// ────────────────────────────────────────────────────────────────────────────

pub struct S3FileStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3FileStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        S3FileStore {
            client,
            bucket: bucket.into(),
        }
    }

    /// Client configured for MinIO (local) or AWS (production).
    pub async fn from_settings(settings: &S3Settings) -> Self {
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "candidates-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&settings.endpoint)
            .load()
            .await;

        S3FileStore::new(aws_sdk_s3::Client::new(&s3_config), settings.bucket.clone())
    }
}

pub fn s3_object_key(file_name: &str) -> String {
    format!("uploads/{file_name}")
}

#[async_trait]
impl FileStore for S3FileStore {
    async fn put(
        &self,
        file_name: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<String, StorageError> {
        let key = s3_object_key(file_name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(content))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);
        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}
