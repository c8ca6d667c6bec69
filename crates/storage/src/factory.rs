//! Backend construction from configuration
//!
//! The configured backend decides which store gets built; callers never
//! branch on backend kind themselves.

use std::sync::Arc;

use vault_core::{Result, StorageBackendKind, StorageSettings};

use crate::{LocalStore, ObjectStore};

/// Build the object store selected by the storage settings
///
/// The container comes from the settings and is validated during
/// construction, so a bad configuration fails here rather than at the
/// first transfer.
///
/// # Errors
/// `Error::InvalidConfig` for an absent container, or for an S3 backend
/// when the `s3` feature is not compiled in.
pub async fn from_settings(settings: &StorageSettings) -> Result<Arc<dyn ObjectStore>> {
    match &settings.backend {
        StorageBackendKind::Local { root } => Ok(Arc::new(
            LocalStore::new(root, &settings.container).await?,
        )),

        #[cfg(feature = "s3")]
        StorageBackendKind::S3 {
            region,
            endpoint,
            force_path_style,
        } => {
            let store = crate::S3Store::with_config(crate::S3Config {
                bucket: settings.container.clone(),
                endpoint_url: endpoint.clone(),
                region: Some(region.clone()),
                force_path_style: *force_path_style,
            })
            .await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "s3"))]
        StorageBackendKind::S3 { .. } => Err(vault_core::Error::InvalidConfig {
            message: "S3 backend configured but the s3 feature is not enabled".to_string(),
        }),
    }
}
