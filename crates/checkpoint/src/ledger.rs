//! Checkpoint ledger: the on-disk "latest version" pointer
//!
//! One text file per checkpoint directory, named `checkpoint`, holding the
//! name of the latest checkpoint in the framework-native pointer format:
//!
//! ```text
//! model_checkpoint_path: "model-3"
//! all_model_checkpoint_paths: "model-3"
//! ```
//!
//! The pointer is the single source of truth for where a restore resumes
//! from. Writes go through a uniquely-named temp file followed by a rename,
//! so a crash mid-write leaves the previous pointer intact. That is the only
//! protection offered: concurrent writers against one directory are not
//! supported (single writer per model is a documented constraint).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;
use vault_core::{CheckpointVersion, Error, Result};

/// File name of the ledger pointer within a checkpoint directory
pub const LEDGER_FILE: &str = "checkpoint";

/// Resolved "latest" pointer for a checkpoint directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestCheckpoint {
    /// Raw checkpoint name from the pointer file, e.g. `model-3`
    pub name: String,

    /// Version parsed from the trailing `-N` of the name
    pub version: CheckpointVersion,

    /// Whether any artifact or archive for this version was found on disk.
    /// An unverified pointer is still returned; the caller decides.
    pub verified: bool,
}

/// Path of the ledger pointer file for a checkpoint directory
pub fn ledger_path(checkpoint_dir: &Path) -> PathBuf {
    checkpoint_dir.join(LEDGER_FILE)
}

/// Read the latest-version pointer for a checkpoint directory
///
/// A missing ledger file is the normal first-run condition and yields
/// `Ok(None)` with a logged warning, never an error. A present but
/// unparsable pointer is `Error::CorruptLedger`.
pub fn read_latest(checkpoint_dir: &Path) -> Result<Option<LatestCheckpoint>> {
    let path = ledger_path(checkpoint_dir);
    if !path.is_file() {
        warn!(
            checkpoint_dir = %checkpoint_dir.display(),
            "No ledger pointer found; treating as fresh start"
        );
        return Ok(None);
    }

    let corrupt = |reason: &str| Error::CorruptLedger {
        path: path.to_string_lossy().to_string(),
        reason: reason.to_string(),
    };

    let contents = fs::read_to_string(&path)?;
    let first_line = contents.lines().next().ok_or_else(|| corrupt("empty"))?;
    let (_, value) = first_line
        .split_once(':')
        .ok_or_else(|| corrupt("missing ':' separator"))?;
    let name = value.trim().trim_matches('"').to_string();
    if name.is_empty() {
        return Err(corrupt("empty checkpoint name"));
    }

    let version: CheckpointVersion = name
        .rsplit_once('-')
        .and_then(|(_, v)| v.parse().ok())
        .ok_or_else(|| corrupt("checkpoint name has no trailing version number"))?;

    let verified = artifact_set_present(checkpoint_dir, &name);
    if !verified {
        warn!(
            checkpoint = %name,
            checkpoint_dir = %checkpoint_dir.display(),
            "Ledger references a checkpoint with no artifacts on disk"
        );
    }

    Ok(Some(LatestCheckpoint {
        name,
        version,
        verified,
    }))
}

/// Overwrite the ledger pointer for a checkpoint directory
///
/// Atomic with respect to partial writes: content goes to a temp file in the
/// same directory, which is then renamed over the pointer.
///
/// # Returns
/// The path of the ledger pointer file
pub fn write_latest(
    checkpoint_dir: &Path,
    prefix: &str,
    version: CheckpointVersion,
) -> Result<PathBuf> {
    let path = ledger_path(checkpoint_dir);
    let name = format!("{}-{}", prefix, version);
    let contents = format!(
        "model_checkpoint_path: \"{}\"\nall_model_checkpoint_paths: \"{}\"\n",
        name, name
    );

    let temp = checkpoint_dir.join(format!(".{}.{}.tmp", LEDGER_FILE, Uuid::new_v4()));
    fs::write(&temp, contents)?;
    fs::rename(&temp, &path)?;

    Ok(path)
}

/// Resolve the next automatic version number for a directory
///
/// `read_latest + 1`, or `1` when no pointer exists yet. An unverified
/// pointer still advances numbering; overwriting a half-saved version is the
/// caller's explicit-version escape hatch.
pub fn next_version(checkpoint_dir: &Path) -> Result<CheckpointVersion> {
    Ok(match read_latest(checkpoint_dir)? {
        Some(latest) => latest.version + 1,
        None => 1,
    })
}

/// Check whether any file for the named checkpoint exists in the directory
fn artifact_set_present(checkpoint_dir: &Path, name: &str) -> bool {
    let Ok(entries) = fs::read_dir(checkpoint_dir) else {
        return false;
    };
    let wanted = format!("{}.", name);
    entries
        .filter_map(|e| e.ok())
        .any(|e| e.file_name().to_string_lossy().starts_with(&wanted))
}
