use crate::keys::generate_object_key;
use crate::traits::{ObjectStore, StorageError, StorageResult, UploadedObject};
use crate::ObjectStoreBackend;
use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::ObjectStore as _;
use object_store::{Attribute, Attributes, PutOptions, PutPayload};
use storefront_core::CandidateFile;

/// S3 object store
#[derive(Clone, Debug)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    fn generate_url(&self, key: &str) -> String {
        public_url(self.endpoint_url.as_deref(), &self.bucket, &self.region, key)
    }
}

/// Public URL of an object.
///
/// AWS uses `https://{bucket}.s3.{region}.amazonaws.com/{key}`; S3-compatible
/// providers use path-style `{endpoint}/{bucket}/{key}`.
fn public_url(endpoint: Option<&str>, bucket: &str, region: &str, key: &str) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    #[tracing::instrument(skip(self, file), fields(
        aws.service.name = "s3",
        aws.s3.bucket = %self.bucket,
        aws.s3.operation = "PutObject",
        s3.size = file.size()
    ))]
    async fn upload(&self, file: &CandidateFile) -> StorageResult<UploadedObject> {
        let key = generate_object_key(file);
        let location = Path::from(key.clone());
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, file.content_type.clone().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&location, PutPayload::from(file.data.clone()), options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        let url = self.generate_url(&key);

        tracing::info!(
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(UploadedObject {
            remote_url: url,
            storage_key: key,
        })
    }

    fn backend_type(&self) -> ObjectStoreBackend {
        ObjectStoreBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aws_url_is_virtual_hosted() {
        assert_eq!(
            public_url(None, "assets", "eu-west-1", "features/a.png"),
            "https://assets.s3.eu-west-1.amazonaws.com/features/a.png"
        );
    }

    #[test]
    fn custom_endpoint_url_is_path_style() {
        assert_eq!(
            public_url(Some("http://localhost:9000/"), "assets", "us-east-1", "features/a.png"),
            "http://localhost:9000/assets/features/a.png"
        );
    }
}
