//! Error types for the checkpoint vault

use thiserror::Error;

/// Result type alias using the vault Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the checkpoint vault
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Checkpoint errors
    #[error("Checkpoint not found for model {model}: {reason}")]
    CheckpointNotFound { model: String, reason: String },

    #[error("Missing checkpoint artifact: {path}")]
    MissingArtifact { path: String },

    #[error("Corrupt archive {path}: {reason}")]
    CorruptArchive { path: String, reason: String },

    #[error("Corrupt ledger {path}: {reason}")]
    CorruptLedger { path: String, reason: String },

    // Remote sync errors
    #[error("Remote sync failed: {message}")]
    RemoteSync { message: String },

    // Storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Storage path not found: {path}")]
    StoragePathNotFound { path: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns true if this error is retryable
    ///
    /// Retrying is the caller's concern; this only classifies. Configuration
    /// and integrity errors never clear up on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RemoteSync { .. } | Error::Storage { .. })
    }

    /// Returns true if this error indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig { .. }
                | Error::CorruptArchive { .. }
                | Error::CorruptLedger { .. }
                | Error::MissingArtifact { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
