//! Configuration module
//!
//! Settings for the backend API client, the object store backend and the
//! upload policy, read from the environment (after loading `.env`).

use std::env;
use std::time::Duration;

use crate::storage_types::ObjectStoreBackend;

const API_URL: &str = "http://localhost:5000";
const HOSTED_UPLOAD_PRESET: &str = "ml_default";
const HTTP_TIMEOUT_SECS: u64 = 60;
const MAX_UPLOAD_SIZE_MB: usize = 10;

/// Limits a candidate file must satisfy before it is sent to the object store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_file_size_bytes: usize,
    /// Lowercase MIME types. Empty means any type is accepted.
    pub allowed_content_types: Vec<String>,
}

impl UploadPolicy {
    /// Policy that accepts every file.
    pub fn permissive() -> Self {
        Self {
            max_file_size_bytes: usize::MAX,
            allowed_content_types: Vec::new(),
        }
    }

    /// Check a file's size and declared content type.
    pub fn check(&self, size: usize, content_type: &str) -> Result<(), String> {
        if size == 0 {
            return Err("file is empty".to_string());
        }
        if size > self.max_file_size_bytes {
            return Err(format!(
                "file is too large ({} bytes, limit {} bytes)",
                size, self.max_file_size_bytes
            ));
        }
        let content_type = content_type.to_lowercase();
        if !self.allowed_content_types.is_empty()
            && !self.allowed_content_types.iter().any(|t| *t == content_type)
        {
            return Err(format!("file type {} is not allowed", content_type));
        }
        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            allowed_content_types: Vec::new(),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub http_timeout: Duration,
    pub object_store_backend: ObjectStoreBackend,
    // Hosted upload endpoint (e.g. https://api.cloudinary.com/v1_1/{cloud}/image/upload)
    pub hosted_upload_url: Option<String>,
    pub hosted_upload_preset: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub upload_policy: UploadPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let object_store_backend = match non_empty("OBJECT_STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => ObjectStoreBackend::Hosted,
        };

        let http_timeout_secs = non_empty("HTTP_TIMEOUT_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a valid number"))
            })
            .transpose()?
            .unwrap_or(HTTP_TIMEOUT_SECS);

        let max_upload_size_mb = non_empty("MAX_UPLOAD_SIZE_MB")
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a valid number"))
            })
            .transpose()?
            .unwrap_or(MAX_UPLOAD_SIZE_MB);
        let max_file_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let allowed_content_types = non_empty("ALLOWED_CONTENT_TYPES")
            .map(|v| split_list(&v))
            .unwrap_or_default();

        Ok(Config {
            api_url: non_empty("STOREFRONT_API_URL")
                .or_else(|| non_empty("API_URL"))
                .unwrap_or_else(|| API_URL.to_string()),
            api_token: non_empty("STOREFRONT_API_TOKEN"),
            http_timeout: Duration::from_secs(http_timeout_secs),
            object_store_backend,
            hosted_upload_url: non_empty("HOSTED_UPLOAD_URL"),
            hosted_upload_preset: non_empty("HOSTED_UPLOAD_PRESET")
                .unwrap_or_else(|| HOSTED_UPLOAD_PRESET.to_string()),
            s3_bucket: non_empty("S3_BUCKET"),
            s3_region: non_empty("S3_REGION").or_else(|| non_empty("AWS_REGION")),
            s3_endpoint: non_empty("S3_ENDPOINT"),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty("LOCAL_STORAGE_BASE_URL"),
            upload_policy: UploadPolicy {
                max_file_size_bytes,
                allowed_content_types,
            },
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "STOREFRONT_API_URL must be an http(s) URL"
            ));
        }

        match self.object_store_backend {
            ObjectStoreBackend::Hosted => {
                if self.hosted_upload_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "HOSTED_UPLOAD_URL must be set when using the hosted object store backend"
                    ));
                }
            }
            ObjectStoreBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 object store backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 object store backend"
                    ));
                }
            }
            ObjectStoreBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local object store backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local object store backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
