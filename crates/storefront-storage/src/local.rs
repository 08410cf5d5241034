use crate::keys::{generate_object_key, is_safe_key};
use crate::traits::{ObjectStore, StorageError, StorageResult, UploadedObject};
use crate::ObjectStoreBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use storefront_core::CandidateFile;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem object store
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored objects (e.g., "/var/lib/storefront/assets")
    /// * `base_url` - Base URL the directory is served from (e.g., "http://localhost:5000/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if !is_safe_key(key) {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes under an explicit key and return its public URL.
    pub async fn write_key(&self, key: &str, data: &[u8]) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(self.generate_url(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn upload(&self, file: &CandidateFile) -> StorageResult<UploadedObject> {
        let key = generate_object_key(file);
        let start = std::time::Instant::now();

        let url = self.write_key(&key, &file.data).await?;

        tracing::info!(
            base_path = %self.base_path.display(),
            key = %key,
            size_bytes = file.size(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(UploadedObject {
            remote_url: url,
            storage_key: key,
        })
    }

    fn backend_type(&self) -> ObjectStoreBackend {
        ObjectStoreBackend::Local
    }
}
