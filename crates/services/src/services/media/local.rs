use std::{io::ErrorKind, path::PathBuf, time::Duration};

use async_trait::async_trait;
use tokio::fs;

use super::{MediaError, MediaStore, MediaUpload, StoredMedia, validate_key};

/// Media on the local filesystem, served by the web server below
/// `public_path`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    public_path: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, public_path: String) -> Result<Self, MediaError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_path: public_path.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, MediaError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, MediaError> {
        let path = self.path_for(&upload.key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &upload.bytes).await?;
        Ok(StoredMedia {
            url: self.url(&upload.key),
            size: upload.bytes.len(),
            key: upload.key,
            content_type: upload.content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), MediaError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.public_path, key)
    }

    async fn signed_url(&self, key: &str, _expires_in: Duration) -> Result<String, MediaError> {
        validate_key(key)?;
        Ok(self.url(key))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn test_upload_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().join("media"), "/media/".to_string()).unwrap();

        let stored = store
            .upload(MediaUpload {
                key: "members/1-dr-lee.webp".to_string(),
                content_type: "image/webp".to_string(),
                bytes: Bytes::from_static(b"webp"),
            })
            .await
            .unwrap();
        assert_eq!(stored.url, "/media/members/1-dr-lee.webp");
        assert_eq!(stored.size, 4);
        let path = dir.path().join("media/members/1-dr-lee.webp");
        assert_eq!(std::fs::read(&path).unwrap(), b"webp");

        store.delete(&stored.key).await.unwrap();
        assert!(!path.exists());
        // Second delete is a no-op.
        store.delete(&stored.key).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().to_path_buf(), "/media".to_string()).unwrap();
        assert!(matches!(
            store.delete("../secret").await,
            Err(MediaError::InvalidKey(_))
        ));
    }
}
