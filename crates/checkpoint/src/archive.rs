//! Archive codec for checkpoint artifact sets
//!
//! Packs the files belonging to one checkpoint version into a single tar
//! archive and unpacks them back out. Entries are stored under their base
//! names, so artifact directory structure is flattened. Filesystem only;
//! no network I/O happens here.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;
use vault_core::{Error, Result};

/// Pack a set of existing artifact files into `{destination}.tar`
///
/// Each artifact is added under its base name. Fails with
/// `Error::MissingArtifact` before writing anything if any input path does
/// not exist.
///
/// # Returns
/// The path of the created archive
pub fn pack(artifact_paths: &[PathBuf], destination: &Path) -> Result<PathBuf> {
    for artifact in artifact_paths {
        if !artifact.is_file() {
            return Err(Error::MissingArtifact {
                path: artifact.to_string_lossy().to_string(),
            });
        }
    }

    let mut tar_path = destination.as_os_str().to_os_string();
    tar_path.push(".tar");
    let tar_path = PathBuf::from(tar_path);

    let file = File::create(&tar_path)?;
    let mut builder = tar::Builder::new(file);

    for artifact in artifact_paths {
        let name = artifact
            .file_name()
            .ok_or_else(|| Error::MissingArtifact {
                path: artifact.to_string_lossy().to_string(),
            })?;
        builder.append_path_with_name(artifact, name)?;
    }

    builder.into_inner()?.sync_all()?;

    debug!(archive = %tar_path.display(), files = artifact_paths.len(), "Packed artifact archive");
    Ok(tar_path)
}

/// Unpack an archive into an existing directory
///
/// This codec never creates directories; `destination_dir` must already
/// exist (the checkpoint manager creates it before calling).
///
/// # Errors
/// `Error::StoragePathNotFound` if the archive or the destination directory
/// is absent; `Error::CorruptArchive` if the archive cannot be opened or an
/// entry cannot be extracted.
pub fn unpack(archive_path: &Path, destination_dir: &Path) -> Result<()> {
    if !archive_path.is_file() {
        return Err(Error::StoragePathNotFound {
            path: archive_path.to_string_lossy().to_string(),
        });
    }
    if !destination_dir.is_dir() {
        return Err(Error::StoragePathNotFound {
            path: destination_dir.to_string_lossy().to_string(),
        });
    }

    let corrupt = |reason: String| Error::CorruptArchive {
        path: archive_path.to_string_lossy().to_string(),
        reason,
    };

    let file = File::open(archive_path).map_err(|e| corrupt(e.to_string()))?;
    let mut archive = tar::Archive::new(file);

    let entries = archive.entries().map_err(|e| corrupt(e.to_string()))?;
    let mut count = 0usize;
    for entry in entries {
        let mut entry = entry.map_err(|e| corrupt(e.to_string()))?;
        entry
            .unpack_in(destination_dir)
            .map_err(|e| corrupt(e.to_string()))?;
        count += 1;
    }

    debug!(archive = %archive_path.display(), entries = count, "Unpacked artifact archive");
    Ok(())
}
