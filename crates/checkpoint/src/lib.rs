//! Checkpoint lifecycle management for model weights
//!
//! Provides versioned save/restore of weight artifacts, tar archive
//! packaging, an atomic "latest" ledger pointer, and optional sync of
//! archives to an object store.

pub mod archive;
pub mod ledger;
pub mod manager;

pub use ledger::LatestCheckpoint;
pub use manager::{
    CheckpointManager, CheckpointManagerConfig, RestoreOptions, SaveOptions, WeightStore,
};
