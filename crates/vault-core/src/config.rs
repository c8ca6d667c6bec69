//! Vault configuration types

use serde::{Deserialize, Serialize};

/// Main vault configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Checkpoint settings
    pub checkpoint: CheckpointSettings,

    /// Storage settings
    pub storage: StorageSettings,
}

/// Checkpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointSettings {
    /// Base directory for checkpoint artifacts and the ledger pointer
    pub checkpoint_dir: String,

    /// Prefix for weight artifact files (`{prefix}-{version}.*`)
    pub weight_file_prefix: String,

    /// Remote path prefix for pushed archives, if syncing remotely
    pub remote_path: Option<String>,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        Self {
            checkpoint_dir: "./model_weights".to_string(),
            weight_file_prefix: "model".to_string(),
            remote_path: None,
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Storage backend selection
    ///
    /// Backend choice is configuration, never code revision.
    pub backend: StorageBackendKind,

    /// Container (bucket or root subdirectory) holding synced archives
    pub container: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::Local {
                root: "./object_store".to_string(),
            },
            container: "ml-models".to_string(),
        }
    }
}

/// Storage backend type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageBackendKind {
    /// Local filesystem, containers as subdirectories of a root
    Local { root: String },

    /// S3-compatible storage
    S3 {
        region: String,
        endpoint: Option<String>,
        force_path_style: bool,
    },
}
