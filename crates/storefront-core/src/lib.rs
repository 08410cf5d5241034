//! Storefront Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration and
//! backend collaborator traits shared by the asset ingestion components.

pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use backend::{Ack, FeatureCatalog, ReferenceStore};
pub use config::{Config, UploadPolicy};
pub use error::{IngestError, IngestResult};
pub use models::{CandidateFile, FeatureAsset, FileSource, IngestionState};
pub use storage_types::ObjectStoreBackend;
