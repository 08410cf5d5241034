//! Object store abstraction trait
//!
//! This module defines the ObjectStore trait that all upload backends implement.

use crate::ObjectStoreBackend;
use async_trait::async_trait;
use storefront_core::CandidateFile;
use thiserror::Error;

/// Object store operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// The endpoint answered, but its body did not report success.
    #[error("Upload rejected by object store: {0}")]
    Rejected(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for object store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Location of an object after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    /// Publicly retrievable URL of the object.
    pub remote_url: String,
    /// Backend-specific identifier (object key or hosted public id).
    pub storage_key: String,
}

/// Object store abstraction trait
///
/// Accepts the raw bytes of a candidate file with its declared name and type and
/// returns a durable retrieval URL. Implementations must only report success
/// when the backend itself confirmed the write.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a candidate file and return its location.
    async fn upload(&self, file: &CandidateFile) -> StorageResult<UploadedObject>;

    /// Get the object store backend type
    fn backend_type(&self) -> ObjectStoreBackend;
}
