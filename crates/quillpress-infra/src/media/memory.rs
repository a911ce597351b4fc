//! In-memory media storage - used in tests and when no media root is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quillpress_core::domain::Media;
use quillpress_core::ports::{MediaError, MediaStorage};

use super::checked_key;

/// Keeps file contents in a map. Data is lost on process restart.
pub struct InMemoryMediaStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
    base_url: String,
}

impl InMemoryMediaStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Number of stored files.
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryMediaStorage {
    fn default() -> Self {
        Self::new("/api/media")
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn store(&self, key: &str, bytes: &[u8]) -> Result<(), MediaError> {
        let key = checked_key(key)?;
        self.files
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, MediaError> {
        self.files
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| MediaError::NotFound(key.to_string()))
    }

    async fn clear(&self, key: &str) -> Result<(), MediaError> {
        self.files.write().await.remove(key);
        Ok(())
    }

    fn url(&self, media: &Media) -> String {
        format!("{}/{}", self.base_url, media.id)
    }
}
