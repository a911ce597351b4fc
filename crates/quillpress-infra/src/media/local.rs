//! Filesystem-backed media storage.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use quillpress_core::domain::Media;
use quillpress_core::ports::{MediaError, MediaStorage};

use super::checked_key;

/// Stores files under a root directory, one path per storage key.
pub struct LocalMediaStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStorage {
    /// `base_url` is the public prefix media URLs are built from.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path(&self, key: &str) -> Result<PathBuf, MediaError> {
        Ok(self.root.join(checked_key(key)?))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(&self, key: &str, bytes: &[u8]) -> Result<(), MediaError> {
        let path = self.path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::Io(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        tracing::debug!(key, size = bytes.len(), "Stored media file");
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, MediaError> {
        let path = self.path(key)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => MediaError::NotFound(key.to_string()),
            _ => MediaError::Io(e.to_string()),
        })
    }

    async fn clear(&self, key: &str) -> Result<(), MediaError> {
        let path = self.path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(MediaError::Io(e.to_string())),
        }

        // Drop the now-empty `{post}/{media}` directory.
        if let Some(dir) = path.parent() {
            let _ = tokio::fs::remove_dir(dir).await;
        }
        Ok(())
    }

    fn url(&self, media: &Media) -> String {
        format!("{}/{}", self.base_url, media.id)
    }
}
