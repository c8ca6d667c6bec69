//! Local filesystem object store
//!
//! Containers are subdirectories under a root path. Used as the default
//! backend in tests and single-machine setups; transfers are atomic
//! (write to .tmp, then rename) so a crashed copy never leaves a partial
//! object behind.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument};
use uuid::Uuid;
use vault_core::{Error, Result};

use crate::ObjectStore;

/// Local filesystem object store
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Root under which every container lives
    root: PathBuf,

    /// Validated target container
    container: String,
}

impl LocalStore {
    /// Create a new LocalStore for an existing container
    ///
    /// # Arguments
    /// * `root` - Directory holding the containers
    /// * `container` - Target container; must already exist under `root`
    ///
    /// # Errors
    /// Returns `Error::Storage` if the root cannot be listed and
    /// `Error::InvalidConfig` if the container is not present.
    pub async fn new<P: AsRef<Path>>(root: P, container: &str) -> Result<Self> {
        let store = Self {
            root: root.as_ref().to_path_buf(),
            container: container.to_string(),
        };

        let containers = store.list_containers().await?;
        if !containers.contains(container) {
            return Err(Error::InvalidConfig {
                message: format!("container {} not found under {:?}", container, store.root),
            });
        }

        Ok(store)
    }

    /// Resolve a key to its absolute path inside the container
    fn resolve_key(&self, key: &str) -> PathBuf {
        self.root.join(&self.container).join(key)
    }

    /// Generate a unique temporary file path next to the target
    fn temp_path(target: &Path) -> PathBuf {
        let temp_name = format!(
            ".{}.{}.tmp",
            target.file_name().unwrap_or_default().to_string_lossy(),
            Uuid::new_v4()
        );
        target.with_file_name(temp_name)
    }

    /// Copy a file atomically, creating the destination's parents
    async fn copy_atomic(src: &Path, dst: &Path) -> Result<u64> {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage {
                    message: format!("Failed to create directory {:?}: {}", parent, e),
                })?;
        }

        let temp = Self::temp_path(dst);
        let size = fs::copy(src, &temp).await.map_err(|e| Error::Storage {
            message: format!("Failed to copy {:?} to {:?}: {}", src, temp, e),
        })?;

        fs::rename(&temp, dst).await.map_err(|e| Error::Storage {
            message: format!("Failed to rename {:?} to {:?}: {}", temp, dst, e),
        })?;

        Ok(size)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    #[instrument(skip(self), fields(backend = "local"))]
    async fn list_containers(&self) -> Result<HashSet<String>> {
        let mut containers = HashSet::new();

        let mut entries = fs::read_dir(&self.root).await.map_err(|e| Error::Storage {
            message: format!("Failed to list containers under {:?}: {}", self.root, e),
        })?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(_) => continue,
            };
            if metadata.is_dir() {
                containers.insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        debug!(count = containers.len(), "Listed local containers");
        Ok(containers)
    }

    #[instrument(skip(self), fields(backend = "local", container = %self.container))]
    async fn upload(&self, local_path: &Path, remote_key: &str) -> Result<()> {
        if fs::metadata(local_path).await.is_err() {
            return Err(Error::StoragePathNotFound {
                path: local_path.to_string_lossy().to_string(),
            });
        }

        let target = self.resolve_key(remote_key);
        let size = Self::copy_atomic(local_path, &target).await?;

        debug!(?local_path, remote_key, size, "Uploaded object");
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "local", container = %self.container))]
    async fn download(&self, remote_key: &str, local_path: &Path) -> Result<()> {
        let source = self.resolve_key(remote_key);
        if fs::metadata(&source).await.is_err() {
            return Err(Error::StoragePathNotFound {
                path: remote_key.to_string(),
            });
        }

        let size = Self::copy_atomic(&source, local_path).await?;

        debug!(remote_key, ?local_path, size, "Downloaded object");
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "local", container = %self.container))]
    async fn exists(&self, remote_key: &str) -> Result<bool> {
        Ok(fs::metadata(self.resolve_key(remote_key)).await.is_ok())
    }
}
