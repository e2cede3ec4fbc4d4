//! Certificate file storage.
//!
//! Consumed as `save(bytes, suggested_name) -> key`. The production backend is
//! S3/MinIO; a failed write surfaces as the request's error, since a
//! microcredential must not silently omit a promised certificate.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use uuid::Uuid;

use crate::errors::AppError;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores the bytes and returns the storage key.
    async fn save(&self, bytes: Vec<u8>, suggested_name: &str) -> Result<String, AppError>;
}

pub struct S3FileStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3FileStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl FileStore for S3FileStore {
    async fn save(&self, bytes: Vec<u8>, suggested_name: &str) -> Result<String, AppError> {
        let key = format!(
            "certificates/{}-{}",
            Uuid::new_v4(),
            sanitize_filename(suggested_name)
        );
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        tracing::info!("Stored certificate at s3://{}/{}", self.bucket, key);
        Ok(key)
    }
}

/// Reduces an uploaded filename to a safe key segment.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "certificate".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_filename("cert-2024.pdf"), "cert-2024.pdf");
    }

    #[test]
    fn test_sanitize_replaces_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[test]
    fn test_sanitize_replaces_spaces_and_unicode() {
        assert_eq!(sanitize_filename("my cert é.pdf"), "my_cert__.pdf");
    }

    #[test]
    fn test_sanitize_falls_back_on_empty() {
        assert_eq!(sanitize_filename(""), "certificate");
        assert_eq!(sanitize_filename("///"), "certificate");
    }
}
