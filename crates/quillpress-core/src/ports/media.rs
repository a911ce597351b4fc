//! Media storage port - where uploaded files live.

use async_trait::async_trait;

use crate::domain::Media;

/// File storage backend for post media.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persist `bytes` under `key`, replacing anything already there.
    async fn store(&self, key: &str, bytes: &[u8]) -> Result<(), MediaError>;

    /// Read back the bytes stored under `key`.
    async fn read(&self, key: &str) -> Result<Vec<u8>, MediaError>;

    /// Remove the file under `key`. Missing files are not an error.
    async fn clear(&self, key: &str) -> Result<(), MediaError>;

    /// Public URL a client uses to retrieve `media`.
    fn url(&self, media: &Media) -> String;
}

/// Media storage errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Media not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O failed: {0}")]
    Io(String),
}
