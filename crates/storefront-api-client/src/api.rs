//! Backend endpoints used by the ingestion pipeline.

use crate::ApiClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_core::{Ack, FeatureAsset, FeatureCatalog, ReferenceStore};

const SAVE_IMAGE_PATH: &str = "/api/admin/products/save-image";
const FEATURE_ADD_PATH: &str = "/api/common/feature/add";
const FEATURE_LIST_PATH: &str = "/api/common/feature/get";

/// Body of the save-image and feature-add endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveImageRequest<'a> {
    pub image: &'a str,
}

/// Feature list response (`{ success, data: [...] }`).
#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureListResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<FeatureAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiClient {
    /// Record an uploaded image URL against the product catalog.
    pub async fn save_image_reference(&self, remote_url: &str) -> Result<Ack> {
        self.post_json(SAVE_IMAGE_PATH, &SaveImageRequest { image: remote_url })
            .await
            .context("Failed to save image reference")
    }

    /// Append an image URL to the feature list.
    pub async fn add_feature_image(&self, remote_url: &str) -> Result<Ack> {
        self.post_json(FEATURE_ADD_PATH, &SaveImageRequest { image: remote_url })
            .await
            .context("Failed to add feature image")
    }

    /// Fetch the feature list in backend order.
    pub async fn list_feature_images(&self) -> Result<Vec<FeatureAsset>> {
        let response: FeatureListResponse = self
            .get(FEATURE_LIST_PATH)
            .await
            .context("Failed to fetch feature images")?;

        if !response.success {
            return Err(anyhow::anyhow!(
                "Feature list rejected by backend: {}",
                response.message.as_deref().unwrap_or("no message")
            ));
        }

        Ok(response.data)
    }
}

#[async_trait]
impl ReferenceStore for ApiClient {
    async fn persist(&self, remote_url: &str) -> Result<Ack> {
        let ack = self.save_image_reference(remote_url).await?;
        tracing::debug!(success = ack.success, "Image reference save answered");
        Ok(ack)
    }
}

#[async_trait]
impl FeatureCatalog for ApiClient {
    async fn append(&self, remote_url: &str) -> Result<Ack> {
        self.add_feature_image(remote_url).await
    }

    async fn list(&self) -> Result<Vec<FeatureAsset>> {
        self.list_feature_images().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn client_for(server: &mockito::ServerGuard, token: Option<&str>) -> ApiClient {
        ApiClient::new(
            format!("{}/", server.url()),
            token.map(String::from),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn persist_posts_image_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", SAVE_IMAGE_PATH)
            .match_body(Matcher::Json(
                serde_json::json!({ "image": "https://cdn/x.png" }),
            ))
            .match_header("authorization", "Bearer admin-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("admin-token"));
        let ack = client.persist("https://cdn/x.png").await.unwrap();

        assert!(ack.success);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn persist_surfaces_success_false() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", SAVE_IMAGE_PATH)
            .with_status(200)
            .with_body(r#"{"success":false,"message":"product not found"}"#)
            .create_async()
            .await;

        let ack = client_for(&server, None)
            .persist("https://cdn/x.png")
            .await
            .unwrap();
        assert_eq!(ack, Ack::rejected("product not found"));
    }

    #[tokio::test]
    async fn server_errors_are_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", FEATURE_ADD_PATH)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client_for(&server, None)
            .append("https://cdn/x.png")
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("500"));
    }

    #[tokio::test]
    async fn list_parses_feature_images() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", FEATURE_LIST_PATH)
            .with_status(200)
            .with_body(
                r#"{"success":true,"data":[{"_id":"a1","image":"https://cdn/1.png"},{"_id":"a2","image":"https://cdn/2.png"}]}"#,
            )
            .create_async()
            .await;

        let assets = client_for(&server, None).list().await.unwrap();
        assert_eq!(
            assets,
            vec![
                FeatureAsset::new("a1", "https://cdn/1.png"),
                FeatureAsset::new("a2", "https://cdn/2.png"),
            ]
        );
    }

    #[tokio::test]
    async fn list_rejects_unsuccessful_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", FEATURE_LIST_PATH)
            .with_status(200)
            .with_body(r#"{"success":false,"message":"Some error occured!"}"#)
            .create_async()
            .await;

        assert!(client_for(&server, None).list().await.is_err());
    }
}
