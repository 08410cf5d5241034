//! Wiring of the ingestion components from configuration.

use std::sync::Arc;

use storefront_api_client::ApiClient;
use storefront_core::{Config, IngestError, IngestResult, ObjectStoreBackend};
use storefront_storage::create_object_store;

use crate::controller::AssetUploadController;
use crate::registry::FeatureAssetRegistry;

/// An upload controller and a feature registry talking to the same backend.
pub struct IngestPipeline {
    pub controller: AssetUploadController,
    pub registry: FeatureAssetRegistry,
    pub backend: ObjectStoreBackend,
}

impl IngestPipeline {
    pub async fn from_config(config: &Config) -> IngestResult<Self> {
        let object_store = create_object_store(config)
            .await
            .map_err(|e| IngestError::Config(e.to_string()))?;
        let client = Arc::new(
            ApiClient::from_config(config).map_err(|e| IngestError::Config(format!("{:#}", e)))?,
        );

        tracing::info!(
            backend = %object_store.backend_type(),
            api_url = %client.base_url(),
            "Ingest pipeline ready"
        );

        Ok(Self {
            backend: object_store.backend_type(),
            controller: AssetUploadController::new(
                object_store,
                client.clone(),
                config.upload_policy.clone(),
            ),
            registry: FeatureAssetRegistry::new(client),
        })
    }
}
