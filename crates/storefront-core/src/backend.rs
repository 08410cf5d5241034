//! Backend collaborator traits
//!
//! The ingestion components talk to the application's own backend only through
//! these traits. The HTTP implementation lives in `storefront-api-client`; tests
//! use in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::FeatureAsset;

/// Acknowledgement body returned by backend write endpoints.
///
/// The explicit `success` flag is authoritative; a 2xx transport status with
/// `success: false` is still a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    /// Turn a `success: false` body into an error carrying the backend message.
    pub fn into_result(self, what: &str) -> anyhow::Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "{} rejected by backend: {}",
                what,
                self.message.as_deref().unwrap_or("no message")
            ))
        }
    }
}

/// Records an object-store URL against the catalog domain.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn persist(&self, remote_url: &str) -> anyhow::Result<Ack>;
}

/// Backend holding the ordered feature-image collection.
#[async_trait]
pub trait FeatureCatalog: Send + Sync {
    /// Append a confirmed URL to the collection.
    async fn append(&self, remote_url: &str) -> anyhow::Result<Ack>;

    /// Fetch the full collection in backend order.
    async fn list(&self) -> anyhow::Result<Vec<FeatureAsset>>;
}
