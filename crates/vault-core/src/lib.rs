//! Vault Core - Foundation for the checkpoint vault workspace
//!
//! Provides the shared types, error taxonomy, and configuration used by the
//! checkpoint lifecycle, storage, and document-store crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CheckpointSettings, StorageBackendKind, StorageSettings, VaultConfig};
pub use error::{Error, Result};
pub use types::*;
