#[cfg(feature = "storage-hosted")]
use crate::HostedUploadStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{ObjectStore, ObjectStoreBackend, StorageError, StorageResult};
use std::sync::Arc;
use storefront_core::Config;

/// Create an object store backend based on configuration
pub async fn create_object_store(config: &Config) -> StorageResult<Arc<dyn ObjectStore>> {
    match config.object_store_backend {
        #[cfg(feature = "storage-hosted")]
        ObjectStoreBackend::Hosted => {
            let upload_url = config.hosted_upload_url.clone().ok_or_else(|| {
                StorageError::ConfigError("HOSTED_UPLOAD_URL not configured".to_string())
            })?;

            let storage = HostedUploadStorage::new(
                upload_url,
                config.hosted_upload_preset.clone(),
                config.http_timeout,
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-hosted"))]
        ObjectStoreBackend::Hosted => Err(StorageError::ConfigError(
            "Hosted object store not available (storage-hosted feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-s3")]
        ObjectStoreBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone())?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        ObjectStoreBackend::S3 => Err(StorageError::ConfigError(
            "S3 object store not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        ObjectStoreBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        ObjectStoreBackend::Local => Err(StorageError::ConfigError(
            "Local object store not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
