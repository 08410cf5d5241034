//! Domain models for asset ingestion.

pub mod candidate;
pub mod feature_asset;
pub mod ingestion;

pub use candidate::{content_type_for_path, CandidateFile, FileSource};
pub use feature_asset::FeatureAsset;
pub use ingestion::IngestionState;
