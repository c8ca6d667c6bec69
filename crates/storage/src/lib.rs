//! Storage - Object store backends for checkpoint archive sync
//!
//! Provides async file transfer against a named container with support for:
//! - Local filesystem containers (default feature)
//! - Amazon S3 / S3-compatible storage (with `s3` feature)
//!
//! Every backend validates its target container at construction time, so a
//! misconfigured store fails fast instead of at the first transfer.
//!
//! # Example
//!
//! ```no_run
//! use storage::{LocalStore, ObjectStore};
//! use std::path::Path;
//!
//! # async fn example() -> vault_core::Result<()> {
//! let store = LocalStore::new("/tmp/object_store", "ml-models").await?;
//! store
//!     .upload(Path::new("./model_weights/model-1.tar"), "resnet/model-1.tar")
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod factory;
mod local;

#[cfg(feature = "s3")]
mod s3;

pub use backend::ObjectStore;
pub use factory::from_settings;
pub use local::LocalStore;

#[cfg(feature = "s3")]
pub use s3::{S3Config, S3Store};
