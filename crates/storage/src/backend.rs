//! Object store trait definition
//!
//! Defines the async interface the checkpoint manager uses to move archives
//! between the local filesystem and a remote container.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use vault_core::Result;

/// Async trait for object store backends
///
/// Implementors move whole files in and out of a single container (an S3
/// bucket, or a directory for the local backend). Transfers run to
/// completion before the future resolves; there is no retry policy here,
/// callers wanting retries wrap the calls themselves.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List the containers visible to this store
    ///
    /// # Returns
    /// The set of container names (buckets for S3)
    ///
    /// # Errors
    /// Returns `Error::Storage` if the listing itself fails
    async fn list_containers(&self) -> Result<HashSet<String>>;

    /// Upload a local file under the given key
    ///
    /// # Arguments
    /// * `local_path` - File to upload; must exist
    /// * `remote_key` - Key within the container, e.g. `resnet/model-1.tar`
    ///
    /// # Errors
    /// Returns `Error::StoragePathNotFound` if `local_path` does not exist
    async fn upload(&self, local_path: &Path, remote_key: &str) -> Result<()>;

    /// Download the object at `remote_key` to a local file
    ///
    /// Parent directories of `local_path` are created if absent.
    ///
    /// # Errors
    /// Returns `Error::StoragePathNotFound` if `remote_key` does not exist
    async fn download(&self, remote_key: &str, local_path: &Path) -> Result<()>;

    /// Check whether an object exists under the given key
    async fn exists(&self, remote_key: &str) -> Result<bool>;
}
