//! Core type definitions for the checkpoint vault

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Model identifier
pub type ModelName = String;

/// Checkpoint version counter, monotonically increasing per model
pub type CheckpointVersion = u64;

/// Record describing one completed checkpoint save
///
/// Created when a save finishes; the on-disk ledger pointer only references
/// a version once all of its artifact files are confirmed written. Records
/// are never deleted automatically (retention is the caller's concern).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Model this checkpoint belongs to
    pub model_name: ModelName,

    /// Version resolved for this save
    pub version: CheckpointVersion,

    /// Artifact files written for this version, in save order
    pub artifact_paths: Vec<PathBuf>,

    /// Archive packed from the artifact set, if any
    pub archive_path: Option<PathBuf>,

    /// Timestamp when the save completed
    pub created_at: DateTime<Utc>,
}

impl CheckpointRecord {
    /// Checkpoint name as stored in the ledger, e.g. `model-3`
    pub fn checkpoint_name(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.version)
    }
}
