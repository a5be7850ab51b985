use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::campaign_log_entries::CampaignLogEntity,
    value_objects::enums::log_entry_statuses::LogEntryStatus,
};

/// Per-recipient delivery log. Entry statuses move pending -> sending ->
/// sent|failed; every transition here is guarded on the prior status so
/// terminal entries can never be rewritten.
#[async_trait]
#[automock]
pub trait CampaignLogRepository {
    /// The recipient queue: pending entries in creation order. Re-queried
    /// lazily once per dispatch invocation, so entries finished by an earlier
    /// run are naturally excluded.
    async fn pending_entries(&self, campaign_id: Uuid) -> Result<Vec<CampaignLogEntity>>;

    /// pending -> sending. Returns 0 when the entry was no longer pending,
    /// in which case the caller must skip it.
    async fn mark_sending(&self, entry_id: Uuid) -> Result<usize>;

    /// sending -> sent, storing what was delivered and when.
    async fn mark_sent(
        &self,
        entry_id: Uuid,
        rendered_message: String,
        template_index: i32,
        sent_at: DateTime<Utc>,
    ) -> Result<usize>;

    /// sending -> failed, storing the transport error verbatim.
    async fn mark_failed(&self, entry_id: Uuid, error: String) -> Result<usize>;

    async fn list_for_campaign(
        &self,
        campaign_id: Uuid,
        status: Option<LogEntryStatus>,
    ) -> Result<Vec<CampaignLogEntity>>;

    /// (status, count) pairs for the statistics view.
    async fn count_by_status(&self, campaign_id: Uuid) -> Result<Vec<(String, i64)>>;
}
