use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{
        campaign_log_entries::InsertCampaignLogEntity,
        campaigns::{CampaignEntity, InsertCampaignEntity},
    },
    value_objects::enums::campaign_statuses::CampaignStatus,
};

/// Campaign rows plus their guarded status transitions. Transition methods
/// return the number of rows they touched so callers can tell a refused
/// transition from a performed one.
#[async_trait]
#[automock]
pub trait CampaignRepository {
    /// Inserts the campaign and its per-recipient log entries in one
    /// transaction.
    async fn create(
        &self,
        insert_campaign_entity: InsertCampaignEntity,
        insert_log_entities: Vec<InsertCampaignLogEntity>,
    ) -> Result<CampaignEntity>;

    async fn find_by_id(&self, campaign_id: Uuid) -> Result<CampaignEntity>;

    async fn list_by_consultant(
        &self,
        consultant_id: Uuid,
        status: Option<CampaignStatus>,
    ) -> Result<Vec<CampaignEntity>>;

    /// Status column only; polled by the dispatch loop between items.
    async fn current_status(&self, campaign_id: Uuid) -> Result<String>;

    /// Compare-and-swap claim draft|paused -> running, recording the first
    /// start time. Returns `None` when the campaign is in any other status,
    /// which is what keeps two concurrent starts from both winning.
    async fn claim_for_run(
        &self,
        campaign_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<CampaignEntity>>;

    /// running -> paused.
    async fn mark_paused(&self, campaign_id: Uuid) -> Result<usize>;

    /// Any non-terminal status -> cancelled, recording the end time.
    async fn mark_cancelled(&self, campaign_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// -> completed with zero pending, recording the end time.
    async fn mark_completed(&self, campaign_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// Point update of the campaign counters and rotation cursor, issued
    /// after every processed item.
    async fn update_progress(
        &self,
        campaign_id: Uuid,
        sent_count: i32,
        failed_count: i32,
        pending_count: i32,
        cursor: i32,
    ) -> Result<()>;

    /// Removes the campaign and its log entries.
    async fn delete(&self, campaign_id: Uuid) -> Result<usize>;
}
