use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::campaign_progress::ProgressUpdate;

/// Seam to the realtime event bus; consumers subscribe per campaign using
/// `domain::value_objects::campaign_progress::progress_topic`.
#[async_trait]
#[automock]
pub trait ProgressPublisher {
    async fn publish(&self, topic: &str, update: &ProgressUpdate) -> Result<()>;
}
