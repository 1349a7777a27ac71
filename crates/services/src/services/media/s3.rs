use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Builder, Region},
    error::DisplayErrorContext,
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use secrecy::ExposeSecret;

use super::{MediaError, MediaStore, MediaUpload, StoredMedia, validate_key};
use crate::services::config::S3Config;

/// Media in an S3 (or S3-compatible) bucket.
#[derive(Clone)]
pub struct S3MediaStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3MediaStore {
    pub fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.expose_secret().to_string(),
            None,
            None,
            "clinic-cms",
        );
        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: public_base_url(config),
        }
    }
}

fn public_base_url(config: &S3Config) -> String {
    let base = match (&config.public_base_url, &config.endpoint) {
        (Some(url), _) => url.clone(),
        (None, Some(endpoint)) => {
            format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket)
        }
        (None, None) => format!(
            "https://{}.s3.{}.amazonaws.com",
            config.bucket, config.region
        ),
    };
    base.trim_end_matches('/').to_string()
}

fn backend_error<E: std::error::Error>(e: E) -> MediaError {
    MediaError::Backend(DisplayErrorContext(&e).to_string())
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, MediaError> {
        validate_key(&upload.key)?;
        let size = upload.bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&upload.key)
            .content_type(&upload.content_type)
            .body(ByteStream::from(upload.bytes))
            .send()
            .await
            .map_err(backend_error)?;
        tracing::debug!(bucket = %self.bucket, key = %upload.key, "Uploaded object");
        Ok(StoredMedia {
            url: self.url(&upload.key),
            key: upload.key,
            content_type: upload.content_type,
            size,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), MediaError> {
        validate_key(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, MediaError> {
        validate_key(key)?;
        let presigning = PresigningConfig::expires_in(expires_in).map_err(backend_error)?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(backend_error)?;
        Ok(request.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(endpoint: Option<&str>, public: Option<&str>) -> S3Config {
        S3Config {
            bucket: "clinic-media".to_string(),
            region: "eu-central-1".to_string(),
            endpoint: endpoint.map(str::to_string),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: SecretString::from("secret".to_string()),
            public_base_url: public.map(str::to_string),
        }
    }

    #[test]
    fn test_public_urls() {
        assert_eq!(
            public_base_url(&config(None, None)),
            "https://clinic-media.s3.eu-central-1.amazonaws.com"
        );
        assert_eq!(
            public_base_url(&config(Some("http://localhost:9000/"), None)),
            "http://localhost:9000/clinic-media"
        );
        assert_eq!(
            public_base_url(&config(None, Some("https://cdn.clinic.test/"))),
            "https://cdn.clinic.test"
        );
    }

    #[tokio::test]
    async fn test_signed_url_is_generated_offline() {
        let store = S3MediaStore::new(&config(Some("http://localhost:9000"), None));
        let url = store
            .signed_url("patient-instructions/1-care.pdf", Duration::from_secs(300))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:9000/clinic-media/patient-instructions/"));
        assert!(url.contains("X-Amz-Signature="));
        assert_eq!(
            store.url("services/a.png"),
            "http://localhost:9000/clinic-media/services/a.png"
        );
    }
}
