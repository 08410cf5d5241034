//! Hosted upload endpoint backend
//!
//! Sends the file as a multipart form (`file` + `upload_preset`) to a third-party
//! image host and reads the retrieval URL from the JSON reply. A reply only counts
//! as a success when the status is 2xx and the body carries a non-empty
//! `secure_url` and no `error` object.

use crate::traits::{ObjectStore, StorageError, StorageResult, UploadedObject};
use crate::ObjectStoreBackend;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use storefront_core::CandidateFile;

#[derive(Debug, Deserialize)]
struct HostedUploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    public_id: Option<String>,
    #[serde(default)]
    error: Option<HostedUploadError>,
}

#[derive(Debug, Deserialize)]
struct HostedUploadError {
    #[serde(default)]
    message: Option<String>,
}

/// Hosted object store (Cloudinary-style unsigned upload)
#[derive(Clone, Debug)]
pub struct HostedUploadStorage {
    client: Client,
    upload_url: String,
    upload_preset: String,
}

impl HostedUploadStorage {
    /// Create a new HostedUploadStorage instance
    ///
    /// # Arguments
    /// * `upload_url` - Upload endpoint (e.g., "https://api.cloudinary.com/v1_1/{cloud}/image/upload")
    /// * `upload_preset` - Unsigned upload preset name
    /// * `timeout` - Request timeout
    pub fn new(
        upload_url: String,
        upload_preset: String,
        timeout: Duration,
    ) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            upload_url,
            upload_preset,
        })
    }

    fn build_form(&self, file: &CandidateFile) -> StorageResult<Form> {
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Invalid content type {}: {}",
                    file.content_type, e
                ))
            })?;

        Ok(Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone()))
    }
}

#[async_trait]
impl ObjectStore for HostedUploadStorage {
    #[tracing::instrument(skip(self, file), fields(
        upload.name = %file.name,
        upload.content_type = %file.content_type,
        upload.size = file.size()
    ))]
    async fn upload(&self, file: &CandidateFile) -> StorageResult<UploadedObject> {
        let start = std::time::Instant::now();
        let form = self.build_form(file)?;

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Hosted upload request failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<HostedUploadResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .and_then(|err| err.message)
                .unwrap_or_else(|| format!("status {}", status));
            tracing::warn!(status = %status, error = %message, "Hosted upload rejected");
            return Err(StorageError::Rejected(message));
        }

        let parsed: HostedUploadResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                status = %status,
                error = %e,
                "Hosted upload returned a non-JSON body"
            );
            StorageError::Rejected(format!("unreadable response (status {})", status))
        })?;

        if let Some(err) = parsed.error {
            let message = err.message.unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!(status = %status, error = %message, "Hosted upload rejected");
            return Err(StorageError::Rejected(message));
        }

        let remote_url = match parsed.secure_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                tracing::warn!(status = %status, "Hosted upload response has no secure_url");
                return Err(StorageError::Rejected(format!(
                    "response without secure_url (status {})",
                    status
                )));
            }
        };

        tracing::info!(
            status = %status,
            remote_url = %remote_url,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Hosted upload successful"
        );

        Ok(UploadedObject {
            storage_key: parsed.public_id.unwrap_or_else(|| remote_url.clone()),
            remote_url,
        })
    }

    fn backend_type(&self) -> ObjectStoreBackend {
        ObjectStoreBackend::Hosted
    }
}
