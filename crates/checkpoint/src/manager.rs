//! Checkpoint manager: save/restore orchestration
//!
//! Coordinates one workflow per call with no state beyond the on-disk
//! ledger: save resolves a version, delegates artifact writing to the
//! model's [`WeightStore`], packs the artifact set, advances the ledger,
//! and optionally pushes the archive to a remote object store; restore runs
//! the cycle in reverse. Every call runs to completion before its future
//! resolves.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use storage::ObjectStore;
use tokio::fs;
use tracing::{error, info, warn};
use vault_core::{CheckpointRecord, CheckpointSettings, CheckpointVersion, Error, Result};

use crate::{archive, ledger};

/// Capability interface for the model layer
///
/// Stands in for the opaque model/session handle: anything that can persist
/// its weights under a path prefix and load them back. Keeps the manager
/// testable without any ML framework in sight.
pub trait WeightStore {
    /// Persist raw weight artifacts under `{path_prefix}-{version}.*`
    ///
    /// # Returns
    /// The artifact paths written, in order
    fn save(&mut self, path_prefix: &Path, version: CheckpointVersion) -> Result<Vec<PathBuf>>;

    /// Load weights from the artifacts under the given path prefix
    fn load(&mut self, path_prefix: &Path) -> Result<()>;
}

/// Checkpoint manager configuration
#[derive(Debug, Clone)]
pub struct CheckpointManagerConfig {
    /// Model these checkpoints belong to
    pub model_name: String,

    /// Directory holding artifacts, archives, and the ledger pointer
    pub checkpoint_dir: PathBuf,

    /// Prefix for weight artifact files (`{prefix}-{version}.*`)
    pub weight_file_prefix: String,
}

impl CheckpointManagerConfig {
    /// Config with the conventional layout: `./model_weights/{model_name}`
    pub fn new(model_name: impl Into<String>) -> Self {
        Self::from_settings(model_name, &CheckpointSettings::default())
    }

    /// Config for one model from the vault's checkpoint settings
    ///
    /// Each model gets its own subdirectory under the configured base
    /// directory.
    pub fn from_settings(model_name: impl Into<String>, settings: &CheckpointSettings) -> Self {
        let model_name = model_name.into();
        Self {
            checkpoint_dir: PathBuf::from(&settings.checkpoint_dir).join(&model_name),
            weight_file_prefix: settings.weight_file_prefix.clone(),
            model_name,
        }
    }
}

/// Options for one save invocation
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Explicit version; overrides automatic numbering entirely and is
    /// stored as-is (resaving a number silently overwrites that checkpoint)
    pub version: Option<CheckpointVersion>,

    /// Push the archive and ledger pointer to the remote store
    pub push_remote: bool,

    /// Remote path prefix, required when `push_remote` is set
    pub remote_path: Option<String>,
}

/// Options for one restore invocation
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    /// Explicit version; otherwise the ledger pointer decides
    pub version: Option<CheckpointVersion>,

    /// Pull the ledger pointer and archive from the remote store first
    pub pull_remote: bool,

    /// Remote path prefix, required when `pull_remote` is set
    pub remote_path: Option<String>,
}

/// Checkpoint manager for one model's save/restore lifecycle
///
/// Assumes a single writer per model; two simultaneous saves against the
/// same directory race on the ledger and artifact files.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
    remote: Option<Arc<dyn ObjectStore>>,
}

impl CheckpointManager {
    /// Create a manager with no remote store (local-only lifecycle)
    pub fn new(config: CheckpointManagerConfig) -> Self {
        Self {
            config,
            remote: None,
        }
    }

    /// Create a manager that can sync archives through the given store
    pub fn with_remote(config: CheckpointManagerConfig, remote: Arc<dyn ObjectStore>) -> Self {
        Self {
            config,
            remote: Some(remote),
        }
    }

    /// Save a checkpoint: artifacts, archive, ledger, optional remote push
    ///
    /// The ledger pointer only advances after artifacts and archive are on
    /// disk, so a failed save leaves the previous pointer valid. A remote
    /// failure after the local save surfaces as `Error::RemoteSync` without
    /// rolling back local state.
    pub async fn save(
        &self,
        weights: &mut dyn WeightStore,
        options: &SaveOptions,
    ) -> Result<CheckpointRecord> {
        let start = Instant::now();
        let dir = &self.config.checkpoint_dir;

        // Required-parameter validation comes before any local write; a
        // misconfigured push must not leave half a checkpoint behind.
        let remote = if options.push_remote {
            Some(self.require_remote(&options.remote_path)?)
        } else {
            None
        };

        fs::create_dir_all(dir).await?;

        let version = match options.version {
            Some(v) => v,
            None => ledger::next_version(dir)?,
        };

        let prefix_path = dir.join(&self.config.weight_file_prefix);
        let artifact_paths = weights.save(&prefix_path, version)?;

        let archive_path = archive::pack(&artifact_paths, &self.checkpoint_base(version))?;

        let ledger_file =
            ledger::write_latest(dir, &self.config.weight_file_prefix, version)?;

        let record = CheckpointRecord {
            model_name: self.config.model_name.clone(),
            version,
            artifact_paths,
            archive_path: Some(archive_path.clone()),
            created_at: Utc::now(),
        };

        info!(
            model = %self.config.model_name,
            version,
            archive = %archive_path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Checkpoint saved"
        );

        if let Some((store, remote_path)) = remote {
            self.push(store, remote_path, &archive_path, &ledger_file)
                .await?;
        }

        Ok(record)
    }

    /// Restore a checkpoint: optional remote pull, resolve, unpack, load
    ///
    /// # Returns
    /// The version the weights were loaded from
    pub async fn restore(
        &self,
        weights: &mut dyn WeightStore,
        options: &RestoreOptions,
    ) -> Result<CheckpointVersion> {
        let start = Instant::now();
        let dir = &self.config.checkpoint_dir;

        let remote = if options.pull_remote {
            Some(self.require_remote(&options.remote_path)?)
        } else {
            None
        };

        fs::create_dir_all(dir).await?;

        // The remote ledger pointer comes down first; it names the archive
        // to fetch.
        if let Some((store, remote_path)) = remote {
            store
                .download(
                    &self.remote_key(remote_path, ledger::LEDGER_FILE),
                    &ledger::ledger_path(dir),
                )
                .await
                .map_err(remote_err)?;
        }

        let version = match options.version {
            Some(v) => v,
            None => match ledger::read_latest(dir)? {
                Some(latest) => latest.version,
                None => {
                    return Err(Error::CheckpointNotFound {
                        model: self.config.model_name.clone(),
                        reason: "no ledger pointer and no explicit version".to_string(),
                    })
                }
            },
        };

        let name = format!("{}-{}", self.config.weight_file_prefix, version);
        let archive_file = format!("{}.tar", name);
        let local_archive = dir.join(&archive_file);

        if let Some((store, remote_path)) = remote {
            store
                .download(&self.remote_key(remote_path, &archive_file), &local_archive)
                .await
                .map_err(remote_err)?;
            archive::unpack(&local_archive, dir)?;
        } else if !self.artifacts_present(&name) {
            // Pure local restores skip unpacking while raw artifacts are
            // still sitting in the directory; otherwise fall back to a
            // previously packed local archive.
            if local_archive.is_file() {
                warn!(
                    checkpoint = %name,
                    "Raw artifacts missing; unpacking local archive"
                );
                archive::unpack(&local_archive, dir)?;
            }
        }

        if !self.artifacts_present(&name) {
            return Err(Error::CheckpointNotFound {
                model: self.config.model_name.clone(),
                reason: format!("artifacts for {} absent after unpacking", name),
            });
        }

        weights.load(&dir.join(&name))?;

        info!(
            model = %self.config.model_name,
            version,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Checkpoint restored"
        );

        Ok(version)
    }

    /// Check whether raw artifacts (anything but the archive) exist for a
    /// checkpoint name
    fn artifacts_present(&self, name: &str) -> bool {
        let Ok(entries) = std::fs::read_dir(&self.config.checkpoint_dir) else {
            return false;
        };
        let wanted = format!("{}.", name);
        let archive = format!("{}.tar", name);
        entries.filter_map(|e| e.ok()).any(|e| {
            let file_name = e.file_name().to_string_lossy().to_string();
            file_name.starts_with(&wanted) && file_name != archive
        })
    }

    /// Base path (no extension) for a version's artifacts and archive
    fn checkpoint_base(&self, version: CheckpointVersion) -> PathBuf {
        self.config
            .checkpoint_dir
            .join(format!("{}-{}", self.config.weight_file_prefix, version))
    }

    /// Remote key under `{remote_path}/{model_name}/`
    fn remote_key(&self, remote_path: &str, file: &str) -> String {
        format!(
            "{}/{}/{}",
            remote_path.trim_end_matches('/'),
            self.config.model_name,
            file
        )
    }

    /// Validate the remote leg's required parameters, failing fast
    fn require_remote<'a>(
        &'a self,
        remote_path: &'a Option<String>,
    ) -> Result<(&'a dyn ObjectStore, &'a str)> {
        let path = remote_path.as_deref().ok_or_else(|| Error::InvalidConfig {
            message: "remote_path not provided for remote sync".to_string(),
        })?;
        let store = self.remote.as_deref().ok_or_else(|| Error::InvalidConfig {
            message: "no remote object store configured".to_string(),
        })?;
        Ok((store, path))
    }

    /// Upload the archive and ledger pointer for a completed local save
    async fn push(
        &self,
        store: &dyn ObjectStore,
        remote_path: &str,
        archive_path: &Path,
        ledger_file: &Path,
    ) -> Result<()> {
        let start = Instant::now();
        let archive_name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        store
            .upload(archive_path, &self.remote_key(remote_path, &archive_name))
            .await
            .map_err(remote_err)?;
        store
            .upload(ledger_file, &self.remote_key(remote_path, ledger::LEDGER_FILE))
            .await
            .map_err(remote_err)?;

        info!(
            model = %self.config.model_name,
            remote_path,
            archive = %archive_name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Checkpoint pushed to remote store"
        );

        Ok(())
    }
}

/// Reclassify transfer failures; local state is already durable by the time
/// the remote leg runs, so the caller may retry this leg alone.
fn remote_err(e: Error) -> Error {
    match e {
        Error::RemoteSync { .. } => e,
        other => {
            error!(error = %other, "Remote transfer failed; local checkpoint state retained");
            Error::RemoteSync {
                message: other.to_string(),
            }
        }
    }
}
