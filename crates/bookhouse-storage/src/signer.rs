//! Download URL Signing
//!
//! Signed URLs let browsers fetch book content straight from the object
//! store without proxying bytes through the API or exposing store
//! credentials. The gateway asks a [`DownloadSigner`] for a time-limited
//! GET URL with response-header overrides, so the same stored object can be
//! served as `attachment; filename="walden.epub"` with the right content
//! type regardless of how it was uploaded.
//!
//! Two implementations:
//! - [`S3Presigner`]: SigV4 presigning against S3/MinIO. Constructed with
//!   the browser-reachable endpoint, which may differ from the endpoint the
//!   gateway itself uploads through (inside Docker the service reaches
//!   MinIO as `http://minio:9000` while browsers need `localhost:9000`).
//! - [`PublicUrlSigner`]: joins keys onto a public base URL for local
//!   development against a filesystem store; no expiry, no header
//!   overrides.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use crate::error::{Error, Result};

/// Issues time-limited download URLs for stored objects.
///
/// Implementations must be Send + Sync; the gateway shares one signer
/// across all requests via Arc<dyn DownloadSigner>.
#[async_trait]
pub trait DownloadSigner: Send + Sync {
    /// Generate a GET URL for `key` that expires after `ttl`.
    ///
    /// `content_type` and `disposition` override the response headers the
    /// store serves with the object.
    async fn signed_url(
        &self,
        key: &str,
        content_type: &str,
        disposition: &str,
        ttl: Duration,
    ) -> Result<String>;
}

/// SigV4 presigner for S3-compatible stores.
///
/// Presigning is pure computation over static credentials; no request is
/// made to the store until a client follows the URL.
pub struct S3Presigner {
    client: Client,
    bucket: String,
}

impl S3Presigner {
    /// Build a presigner for one bucket.
    ///
    /// # Arguments
    ///
    /// * `bucket` - Bucket holding book content
    /// * `region` - Store region (MinIO accepts any)
    /// * `endpoint` - Browser-reachable endpoint override, or None for AWS
    /// * `access_key` / `secret_key` - Static credentials embedded in the
    ///   signature
    pub fn new(
        bucket: String,
        region: String,
        endpoint: Option<String>,
        access_key: String,
        secret_key: String,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "bookhouse");
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region))
            .credentials_provider(credentials)
            // MinIO serves buckets by path, not virtual host
            .force_path_style(true);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket,
        }
    }
}

#[async_trait]
impl DownloadSigner for S3Presigner {
    async fn signed_url(
        &self,
        key: &str,
        content_type: &str,
        disposition: &str,
        ttl: Duration,
    ) -> Result<String> {
        let config =
            PresigningConfig::expires_in(ttl).map_err(|e| Error::Presign(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .response_content_type(content_type)
            .response_content_disposition(disposition)
            .presigned(config)
            .await
            .map_err(|e| Error::Presign(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}

/// Joins keys onto a public base URL. For local development where the
/// object store is a directory served by a static file server; links never
/// expire and the response-header overrides are not applied.
pub struct PublicUrlSigner {
    base_url: String,
}

impl PublicUrlSigner {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DownloadSigner for PublicUrlSigner {
    async fn signed_url(
        &self,
        key: &str,
        _content_type: &str,
        _disposition: &str,
        _ttl: Duration,
    ) -> Result<String> {
        Ok(format!("{}/{}", self.base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn presigned_url_carries_response_overrides() {
        let signer = S3Presigner::new(
            "bookhouse".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000".to_string()),
            "minioadmin".to_string(),
            "minioadmin".to_string(),
        );

        let url = signer
            .signed_url(
                "books/abc_Walden.pdf",
                "application/pdf",
                "attachment; filename=\"walden.pdf\"",
                Duration::from_secs(3600),
            )
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/bookhouse/books/abc_Walden.pdf"));
        assert!(url.contains("response-content-type"));
        assert!(url.contains("response-content-disposition"));
        assert!(url.contains("X-Amz-Expires=3600"));
    }

    #[tokio::test]
    async fn public_url_signer_joins_cleanly() {
        let signer = PublicUrlSigner::new("http://localhost:8080/".to_string());
        let url = signer
            .signed_url("books/abc.pdf", "application/pdf", "inline", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8080/books/abc.pdf");
    }
}
