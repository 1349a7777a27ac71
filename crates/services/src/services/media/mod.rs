//! Storage for uploaded images and documents.
//!
//! [`MediaStore`] is the backend seam (local disk or S3). [`MediaService`]
//! sits in front of it and applies the upload policy: allowed content types
//! per purpose, the size limit and key generation.

mod local;
mod s3;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use ts_rs::TS;
use uuid::Uuid;

pub use local::LocalMediaStore;
pub use s3::S3MediaStore;

use super::config::{MediaBackendConfig, MediaConfig};

const IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/svg+xml",
    "image/avif",
];
const DOCUMENT_TYPES: &[&str] = &["application/pdf"];

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("file is empty")]
    Empty,
    #[error("file is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
    #[error("unsupported media type '{content_type}', expected one of: {allowed}")]
    UnsupportedType {
        content_type: String,
        allowed: String,
    },
    #[error("invalid media key '{0}'")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// An object ready to be written: the key is final and the content type
/// has been checked.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub key: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct StoredMedia {
    pub key: String,
    pub url: String,
    pub content_type: String,
    pub size: usize,
}

/// A file as received from a client.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, MediaError>;

    /// Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<(), MediaError>;

    /// Public URL of `key`.
    fn url(&self, key: &str) -> String;

    /// Time-limited URL for `key`. Backends without access control return
    /// the public URL.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, MediaError>;
}

/// What an upload is for. Decides the key prefix and the accepted types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPurpose {
    ServiceImage,
    TechnologyImage,
    MemberPortrait,
    FirstVisitImage,
    HeroImage,
    InstructionAttachment,
    /// Images embedded in rich-text bodies.
    EditorImage,
}

impl MediaPurpose {
    pub fn folder(self) -> &'static str {
        match self {
            MediaPurpose::ServiceImage => "services",
            MediaPurpose::TechnologyImage => "technologies",
            MediaPurpose::MemberPortrait => "members",
            MediaPurpose::FirstVisitImage => "first-visit",
            MediaPurpose::HeroImage => "homepage",
            MediaPurpose::InstructionAttachment => "patient-instructions",
            MediaPurpose::EditorImage => "editor",
        }
    }

    pub fn allowed_types(self) -> &'static [&'static str] {
        match self {
            MediaPurpose::InstructionAttachment => DOCUMENT_TYPES,
            _ => IMAGE_TYPES,
        }
    }
}

#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn MediaStore>,
    max_upload_bytes: usize,
}

impl MediaService {
    pub fn new(store: Arc<dyn MediaStore>, max_upload_bytes: usize) -> Self {
        Self {
            store,
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Result<Self, MediaError> {
        let store: Arc<dyn MediaStore> = match &config.backend {
            MediaBackendConfig::Local { root, public_path } => {
                Arc::new(LocalMediaStore::new(root.clone(), public_path.clone())?)
            }
            MediaBackendConfig::S3(s3) => Arc::new(S3MediaStore::new(s3)),
        };
        Ok(Self::new(store, config.max_upload_bytes))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Checks `file` against the policy for `purpose` and assigns its key.
    pub fn prepare(&self, file: IncomingFile, purpose: MediaPurpose) -> Result<MediaUpload, MediaError> {
        if file.bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        if file.bytes.len() > self.max_upload_bytes {
            return Err(MediaError::TooLarge {
                size: file.bytes.len(),
                limit: self.max_upload_bytes,
            });
        }

        let content_type = resolve_content_type(file.content_type.as_deref(), &file.file_name);
        let allowed = purpose.allowed_types();
        if !allowed.contains(&content_type.as_str()) {
            return Err(MediaError::UnsupportedType {
                content_type,
                allowed: allowed.join(", "),
            });
        }

        let key = format!(
            "{}/{}-{}",
            purpose.folder(),
            Uuid::new_v4(),
            utils::text::sanitize_file_name(&file.file_name)
        );
        Ok(MediaUpload {
            key,
            content_type,
            bytes: file.bytes,
        })
    }

    pub async fn upload(
        &self,
        file: IncomingFile,
        purpose: MediaPurpose,
    ) -> Result<StoredMedia, MediaError> {
        let upload = self.prepare(file, purpose)?;
        let stored = self.store.upload(upload).await?;
        debug!(key = %stored.key, size = stored.size, "Stored media");
        Ok(stored)
    }

    /// Best-effort delete. Failures are logged and never retried.
    pub async fn discard_media(&self, key: Option<&str>) {
        let Some(key) = key else {
            return;
        };
        if let Err(e) = self.store.delete(key).await {
            warn!(key, error = %e, "Failed to delete media object");
        }
    }

    pub async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, MediaError> {
        self.store.signed_url(key, expires_in).await
    }
}

/// The client's declared type, falling back to a guess from the file name
/// when it is missing or generic.
fn resolve_content_type(declared: Option<&str>, file_name: &str) -> String {
    let declared = declared
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty() && value != "application/octet-stream");
    match declared {
        Some(value) if value == "image/jpg" => "image/jpeg".to_string(),
        Some(value) => value,
        None => mime_guess::from_path(file_name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string(),
    }
}

/// Keys are generated by [`MediaService::prepare`]; anything else reaching a
/// backend is rejected.
pub(crate) fn validate_key(key: &str) -> Result<(), MediaError> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if valid {
        Ok(())
    } else {
        Err(MediaError::InvalidKey(key.to_string()))
    }
}
