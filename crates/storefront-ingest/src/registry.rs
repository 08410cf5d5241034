//! Feature image registry
//!
//! Read-through cache of the backend's feature image list. A confirmed upload
//! only enters the list through [`FeatureAssetRegistry::commit`]; the cache is
//! always reloaded from the backend afterwards, never patched locally.

use std::sync::Arc;

use serde::Serialize;
use storefront_core::{FeatureAsset, FeatureCatalog, IngestError, IngestResult};

use crate::controller::AssetUploadController;

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    pub remote_url: String,
    /// False when the append succeeded but the follow-up reload did not; the
    /// cached list is then stale until the next refresh.
    pub assets_refreshed: bool,
}

pub struct FeatureAssetRegistry {
    catalog: Arc<dyn FeatureCatalog>,
    assets: Vec<FeatureAsset>,
    last_error: Option<String>,
}

impl FeatureAssetRegistry {
    pub fn new(catalog: Arc<dyn FeatureCatalog>) -> Self {
        Self {
            catalog,
            assets: Vec::new(),
            last_error: None,
        }
    }

    /// Reload the list from the backend.
    ///
    /// On failure the last successfully loaded list is kept.
    pub async fn refresh(&mut self) -> IngestResult<&[FeatureAsset]> {
        match self.catalog.list().await {
            Ok(assets) => {
                tracing::info!(count = assets.len(), "Feature images loaded");
                self.assets = assets;
                self.last_error = None;
                Ok(&self.assets)
            }
            Err(e) => {
                let error = IngestError::RefreshFailure(format!("{:#}", e));
                tracing::error!(
                    error_code = error.error_code(),
                    error = %error,
                    cached = self.assets.len(),
                    "Failed to load feature images, keeping cached list"
                );
                self.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Append the controller's confirmed URL to the feature list.
    ///
    /// On success the list is reloaded once and the controller returns to
    /// `Empty`. On failure the controller keeps its confirmed URL so the
    /// commit can be retried.
    pub async fn commit(&mut self, controller: &AssetUploadController) -> IngestResult<CommitOutcome> {
        let remote_url = controller.confirmed_url().unwrap_or_default();
        let outcome = self.append_url(&remote_url).await?;
        controller.reset_after_commit(&outcome.remote_url);
        Ok(outcome)
    }

    pub(crate) async fn append_url(&mut self, remote_url: &str) -> IngestResult<CommitOutcome> {
        if remote_url.is_empty() {
            let error = IngestError::NothingToCommit;
            tracing::info!(error_code = error.error_code(), "Commit requested without an uploaded image");
            self.last_error = Some(error.to_string());
            return Err(error);
        }

        let appended = self
            .catalog
            .append(remote_url)
            .await
            .and_then(|ack| ack.into_result("add feature image"));
        if let Err(e) = appended {
            let error = IngestError::CommitFailure(format!("{:#}", e));
            tracing::error!(
                remote_url = %remote_url,
                error_code = error.error_code(),
                error = %error,
                "Failed to add feature image"
            );
            self.last_error = Some(error.to_string());
            return Err(error);
        }

        tracing::info!(remote_url = %remote_url, "Feature image added");
        self.last_error = None;
        let assets_refreshed = self.refresh().await.is_ok();

        Ok(CommitOutcome {
            remote_url: remote_url.to_string(),
            assets_refreshed,
        })
    }

    pub fn assets(&self) -> &[FeatureAsset] {
        &self.assets
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{png_file, MockFeatureCatalog, MockObjectStore, MockReferenceStore};
    use storefront_core::{Ack, FileSource, IngestionState, UploadPolicy};

    fn registry(catalog: &Arc<MockFeatureCatalog>) -> FeatureAssetRegistry {
        FeatureAssetRegistry::new(catalog.clone())
    }

    async fn confirmed_controller(name: &str) -> AssetUploadController {
        let controller = AssetUploadController::new(
            Arc::new(MockObjectStore::new()),
            Arc::new(MockReferenceStore::new()),
            UploadPolicy::default(),
        );
        controller
            .select_file(FileSource::Picker(vec![png_file(name)]))
            .unwrap()
            .wait()
            .await;
        controller
    }

    #[tokio::test]
    async fn refresh_replaces_cache() {
        let catalog = Arc::new(MockFeatureCatalog::with_assets(vec![
            FeatureAsset::new("1", "https://cdn.example.com/a.png"),
            FeatureAsset::new("2", "https://cdn.example.com/b.png"),
        ]));
        let mut registry = registry(&catalog);
        assert!(registry.is_empty());

        let assets = registry.refresh().await.unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(registry.assets()[1].remote_url, "https://cdn.example.com/b.png");
    }

    #[tokio::test]
    async fn refresh_failure_keeps_last_known_list() {
        let catalog = Arc::new(MockFeatureCatalog::with_assets(vec![FeatureAsset::new(
            "1",
            "https://cdn.example.com/a.png",
        )]));
        let mut registry = registry(&catalog);
        registry.refresh().await.unwrap();

        catalog.push_list_failure("connection refused");
        let err = registry.refresh().await.unwrap_err();

        assert!(matches!(err, IngestError::RefreshFailure(_)));
        assert_eq!(registry.assets().len(), 1);
        assert!(registry.last_error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn commit_without_confirmed_url_makes_no_call() {
        let catalog = Arc::new(MockFeatureCatalog::new());
        let mut registry = registry(&catalog);
        let controller = AssetUploadController::new(
            Arc::new(MockObjectStore::new()),
            Arc::new(MockReferenceStore::new()),
            UploadPolicy::default(),
        );

        let err = registry.commit(&controller).await.unwrap_err();

        assert!(matches!(err, IngestError::NothingToCommit));
        assert!(registry.last_error().is_some());
        assert!(catalog.append_calls().is_empty());
        assert_eq!(catalog.list_calls(), 0);
    }

    #[tokio::test]
    async fn empty_url_is_rejected_locally() {
        let catalog = Arc::new(MockFeatureCatalog::new());
        let mut registry = registry(&catalog);

        let err = registry.append_url("").await.unwrap_err();

        assert!(matches!(err, IngestError::NothingToCommit));
        assert!(catalog.append_calls().is_empty());
    }

    #[tokio::test]
    async fn commit_appends_refreshes_once_and_resets_controller() {
        let catalog = Arc::new(MockFeatureCatalog::new());
        let mut registry = registry(&catalog);
        let controller = confirmed_controller("banner.png").await;
        let url = "https://cdn.example.com/banner.png";

        let outcome = registry.commit(&controller).await.unwrap();

        assert_eq!(outcome.remote_url, url);
        assert!(outcome.assets_refreshed);
        assert_eq!(catalog.append_calls(), vec![url.to_string()]);
        assert_eq!(catalog.list_calls(), 1);
        assert_eq!(registry.assets(), &[FeatureAsset::new("1", url)]);
        assert_eq!(controller.state(), IngestionState::Empty);
        assert_eq!(registry.last_error(), None);
    }

    #[tokio::test]
    async fn rejected_append_keeps_controller_confirmed() {
        let catalog = Arc::new(MockFeatureCatalog::new());
        catalog.push_append_ack(Ack::rejected("limit reached"));
        let mut registry = registry(&catalog);
        let controller = confirmed_controller("banner.png").await;

        let err = registry.commit(&controller).await.unwrap_err();

        assert!(matches!(err, IngestError::CommitFailure(_)));
        assert!(registry.last_error().unwrap().contains("limit reached"));
        assert_eq!(catalog.list_calls(), 0);
        assert_eq!(
            controller.confirmed_url().as_deref(),
            Some("https://cdn.example.com/banner.png")
        );

        // Retrying the same commit succeeds
        registry.commit(&controller).await.unwrap();
        assert_eq!(registry.assets().len(), 1);
    }

    #[tokio::test]
    async fn append_error_is_a_commit_failure() {
        let catalog = Arc::new(MockFeatureCatalog::new());
        catalog.push_append_failure("503 Service Unavailable");
        let mut registry = registry(&catalog);
        let controller = confirmed_controller("banner.png").await;

        let err = registry.commit(&controller).await.unwrap_err();

        assert!(err.is_recoverable());
        assert!(controller.confirmed_url().is_some());
    }

    #[tokio::test]
    async fn failed_reload_after_commit_is_reported() {
        let catalog = Arc::new(MockFeatureCatalog::new());
        catalog.push_list_failure("timeout");
        let mut registry = registry(&catalog);
        let controller = confirmed_controller("banner.png").await;

        let outcome = registry.commit(&controller).await.unwrap();

        assert!(!outcome.assets_refreshed);
        assert!(registry.is_empty());
        assert_eq!(controller.state(), IngestionState::Empty);
        assert!(registry.last_error().is_some());
    }
}
