//! Storefront Storage Library
//!
//! This crate provides the `ObjectStore` abstraction the upload controller sends
//! candidate files to, and its backends: a hosted upload endpoint, S3 and the
//! local filesystem.
//!
//! # Object key format
//!
//! Backends that choose their own keys (S3, local) store feature images as
//! `features/{uuid}.{ext}`. Key generation is centralized in the `keys` module.
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-hosted")]
pub mod hosted;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_object_store;
#[cfg(feature = "storage-hosted")]
pub use hosted::HostedUploadStorage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use storefront_core::ObjectStoreBackend;
pub use traits::{ObjectStore, StorageError, StorageResult, UploadedObject};
