use async_trait::async_trait;

use crate::domain::Activity;
use crate::error::RepoError;

/// Write-mostly audit log of post mutations.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, activity: Activity) -> Result<(), RepoError>;

    /// Most recent entries first.
    async fn latest(&self, limit: u64) -> Result<Vec<Activity>, RepoError>;
}
