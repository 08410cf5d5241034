//! Storefront asset ingestion
//!
//! The two-phase flow that turns an administrator's file into an entry of the
//! storefront's feature image list:
//!
//! 1. [`AssetUploadController`] takes one candidate file, uploads it to the object
//!    store as soon as it is selected and records the resulting URL with the
//!    backend. The outcome is a confirmed URL or a readable error.
//! 2. [`FeatureAssetRegistry`] promotes a confirmed URL into the backend's feature
//!    list on an explicit commit, then reloads the list from the backend.

pub mod controller;
pub mod pipeline;
pub mod registry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use controller::{
    ActionRejection, AssetUploadController, InputControl, SelectRejection, UploadTask,
};
pub use pipeline::IngestPipeline;
pub use registry::{CommitOutcome, FeatureAssetRegistry};
pub use storefront_core::{CandidateFile, FeatureAsset, FileSource, IngestError, IngestionState};
