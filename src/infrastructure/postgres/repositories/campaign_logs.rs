use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::{
        entities::campaign_log_entries::CampaignLogEntity,
        repositories::campaign_logs::CampaignLogRepository,
        value_objects::enums::log_entry_statuses::LogEntryStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::campaign_log_entries},
};

pub struct CampaignLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CampaignLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CampaignLogRepository for CampaignLogPostgres {
    async fn pending_entries(&self, campaign_id: Uuid) -> Result<Vec<CampaignLogEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let entries = campaign_log_entries::table
            .filter(campaign_log_entries::campaign_id.eq(campaign_id))
            .filter(campaign_log_entries::status.eq(LogEntryStatus::Pending.to_string()))
            .order(campaign_log_entries::created_at.asc())
            .select(CampaignLogEntity::as_select())
            .load::<CampaignLogEntity>(&mut conn)?;

        Ok(entries)
    }

    async fn mark_sending(&self, entry_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = diesel::update(
            campaign_log_entries::table
                .find(entry_id)
                .filter(campaign_log_entries::status.eq(LogEntryStatus::Pending.to_string())),
        )
        .set(campaign_log_entries::status.eq(LogEntryStatus::Sending.to_string()))
        .execute(&mut conn)?;

        Ok(affected)
    }

    async fn mark_sent(
        &self,
        entry_id: Uuid,
        rendered_message: String,
        template_index: i32,
        sent_at: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = diesel::update(
            campaign_log_entries::table
                .find(entry_id)
                .filter(campaign_log_entries::status.eq(LogEntryStatus::Sending.to_string())),
        )
        .set((
            campaign_log_entries::status.eq(LogEntryStatus::Sent.to_string()),
            campaign_log_entries::rendered_message.eq(Some(rendered_message)),
            campaign_log_entries::template_index.eq(Some(template_index)),
            campaign_log_entries::sent_at.eq(Some(sent_at)),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }

    async fn mark_failed(&self, entry_id: Uuid, error: String) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = diesel::update(
            campaign_log_entries::table
                .find(entry_id)
                .filter(campaign_log_entries::status.eq(LogEntryStatus::Sending.to_string())),
        )
        .set((
            campaign_log_entries::status.eq(LogEntryStatus::Failed.to_string()),
            campaign_log_entries::error.eq(Some(error)),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }

    async fn list_for_campaign(
        &self,
        campaign_id: Uuid,
        status: Option<LogEntryStatus>,
    ) -> Result<Vec<CampaignLogEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = campaign_log_entries::table
            .filter(campaign_log_entries::campaign_id.eq(campaign_id))
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(campaign_log_entries::status.eq(status.to_string()));
        }

        let entries = query
            .order(campaign_log_entries::created_at.asc())
            .select(CampaignLogEntity::as_select())
            .load::<CampaignLogEntity>(&mut conn)?;

        Ok(entries)
    }

    async fn count_by_status(&self, campaign_id: Uuid) -> Result<Vec<(String, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let counts = campaign_log_entries::table
            .filter(campaign_log_entries::campaign_id.eq(campaign_id))
            .group_by(campaign_log_entries::status)
            .select((campaign_log_entries::status, diesel::dsl::count_star()))
            .load::<(String, i64)>(&mut conn)?;

        Ok(counts)
    }
}
