//! S3 object store
//!
//! S3-compatible backend for archive sync with custom endpoint support
//! (MinIO, LocalStack, etc.). The target bucket is validated against
//! `list_buckets` at construction, so credential or naming problems surface
//! before the first transfer instead of mid-save.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{config::Builder as S3ConfigBuilder, primitives::ByteStream, Client};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use vault_core::{Error, Result};

use crate::ObjectStore;

/// S3-compatible object store
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

/// Configuration for S3Store
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name (the container)
    pub bucket: String,
    /// Optional custom endpoint URL (for MinIO, LocalStack, etc.)
    pub endpoint_url: Option<String>,
    /// AWS region (default: "us-east-1")
    pub region: Option<String>,
    /// Force path-style addressing (required for MinIO)
    pub force_path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            endpoint_url: None,
            region: Some("us-east-1".to_string()),
            force_path_style: false,
        }
    }
}

impl S3Store {
    /// Create a new S3Store with default AWS configuration
    ///
    /// Uses environment variables or instance profile for credentials.
    pub async fn new(bucket: impl Into<String>) -> Result<Self> {
        Self::with_config(S3Config {
            bucket: bucket.into(),
            ..Default::default()
        })
        .await
    }

    /// Create a new S3Store with custom configuration
    ///
    /// # Errors
    /// Returns `Error::Storage` if the bucket list cannot be fetched
    /// (connectivity or credentials) and `Error::InvalidConfig` if the
    /// target bucket is not among the caller's buckets.
    pub async fn with_config(config: S3Config) -> Result<Self> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(
                config.region.unwrap_or_else(|| "us-east-1".to_string()),
            ))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        if let Some(endpoint) = &config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let store = Self {
            client: Client::from_conf(s3_config_builder.build()),
            bucket: config.bucket.clone(),
        };

        let buckets = store.list_containers().await?;
        if !buckets.contains(&config.bucket) {
            return Err(Error::InvalidConfig {
                message: format!("bucket {} not found on S3", config.bucket),
            });
        }

        Ok(store)
    }

    /// Create an S3Store for MinIO (convenience constructor)
    pub async fn minio(endpoint: &str, bucket: &str) -> Result<Self> {
        Self::with_config(S3Config {
            bucket: bucket.to_string(),
            endpoint_url: Some(endpoint.to_string()),
            force_path_style: true,
            ..Default::default()
        })
        .await
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self), fields(backend = "s3"))]
    async fn list_containers(&self) -> Result<HashSet<String>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| Error::Storage {
                message: format!("S3 list_buckets failed: {}", e),
            })?;

        let buckets: HashSet<String> = response
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(String::from))
            .collect();

        debug!(count = buckets.len(), "Listed S3 buckets");
        Ok(buckets)
    }

    #[instrument(skip(self), fields(backend = "s3", bucket = %self.bucket))]
    async fn upload(&self, local_path: &Path, remote_key: &str) -> Result<()> {
        if fs::metadata(local_path).await.is_err() {
            return Err(Error::StoragePathNotFound {
                path: local_path.to_string_lossy().to_string(),
            });
        }

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| Error::Storage {
                message: format!("Failed to open {:?} for upload: {}", local_path, e),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(remote_key)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Storage {
                message: format!("S3 put_object failed for {}: {}", remote_key, e),
            })?;

        debug!(?local_path, remote_key, "Uploaded object to S3");
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "s3", bucket = %self.bucket))]
    async fn download(&self, remote_key: &str, local_path: &Path) -> Result<()> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(remote_key)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("NoSuchKey") {
                    Error::StoragePathNotFound {
                        path: remote_key.to_string(),
                    }
                } else {
                    Error::Storage {
                        message: format!("S3 get_object failed for {}: {}", remote_key, e),
                    }
                }
            })?;

        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage {
                    message: format!("Failed to create directory {:?}: {}", parent, e),
                })?;
        }

        // Write through a temp file so an interrupted download never leaves
        // a truncated archive at the destination. The body is streamed
        // chunk by chunk; archives can be larger than memory.
        let temp_path = local_path.with_extension("s3tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Storage {
                message: format!("Failed to create {:?}: {}", temp_path, e),
            })?;
        let mut body = result.body;
        while let Some(chunk) = body.try_next().await.map_err(|e| Error::Storage {
            message: format!("Failed to read S3 response body: {}", e),
        })? {
            file.write_all(&chunk).await.map_err(|e| Error::Storage {
                message: format!("Failed to write download: {}", e),
            })?;
        }
        file.sync_all().await.map_err(|e| Error::Storage {
            message: format!("Failed to sync download: {}", e),
        })?;
        fs::rename(&temp_path, local_path)
            .await
            .map_err(|e| Error::Storage {
                message: format!("Failed to rename {:?} to {:?}: {}", temp_path, local_path, e),
            })?;

        debug!(remote_key, ?local_path, "Downloaded object from S3");
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "s3", bucket = %self.bucket))]
    async fn exists(&self, remote_key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(remote_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("404") {
                    Ok(false)
                } else {
                    Err(Error::Storage {
                        message: format!("S3 head_object failed: {}", e),
                    })
                }
            }
        }
    }
}
