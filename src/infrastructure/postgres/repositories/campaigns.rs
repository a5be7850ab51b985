use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            campaign_log_entries::InsertCampaignLogEntity,
            campaigns::{CampaignEntity, InsertCampaignEntity},
        },
        repositories::campaigns::CampaignRepository,
        value_objects::enums::campaign_statuses::CampaignStatus,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{campaign_log_entries, campaigns},
    },
};

pub struct CampaignPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CampaignPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CampaignRepository for CampaignPostgres {
    async fn create(
        &self,
        insert_campaign_entity: InsertCampaignEntity,
        insert_log_entities: Vec<InsertCampaignLogEntity>,
    ) -> Result<CampaignEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let campaign = conn.transaction::<CampaignEntity, diesel::result::Error, _>(|conn| {
            let campaign = diesel::insert_into(campaigns::table)
                .values(&insert_campaign_entity)
                .returning(CampaignEntity::as_select())
                .get_result::<CampaignEntity>(conn)?;

            diesel::insert_into(campaign_log_entries::table)
                .values(&insert_log_entities)
                .execute(conn)?;

            Ok(campaign)
        })?;

        Ok(campaign)
    }

    async fn find_by_id(&self, campaign_id: Uuid) -> Result<CampaignEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let campaign = campaigns::table
            .find(campaign_id)
            .select(CampaignEntity::as_select())
            .first::<CampaignEntity>(&mut conn)?;

        Ok(campaign)
    }

    async fn list_by_consultant(
        &self,
        consultant_id: Uuid,
        status: Option<CampaignStatus>,
    ) -> Result<Vec<CampaignEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = campaigns::table
            .filter(campaigns::consultant_id.eq(consultant_id))
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(campaigns::status.eq(status.to_string()));
        }

        let result = query
            .order(campaigns::created_at.desc())
            .select(CampaignEntity::as_select())
            .load::<CampaignEntity>(&mut conn)?;

        Ok(result)
    }

    async fn current_status(&self, campaign_id: Uuid) -> Result<String> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let status = campaigns::table
            .find(campaign_id)
            .select(campaigns::status)
            .first::<String>(&mut conn)?;

        Ok(status)
    }

    async fn claim_for_run(
        &self,
        campaign_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<CampaignEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Guarded update is the run lease: of two concurrent starts only one
        // sees a claimable status.
        let claimed = conn.transaction::<Option<CampaignEntity>, diesel::result::Error, _>(
            |conn| {
                let claimed: Option<CampaignEntity> = diesel::update(
                    campaigns::table.find(campaign_id).filter(
                        campaigns::status.eq_any([
                            CampaignStatus::Draft.to_string(),
                            CampaignStatus::Paused.to_string(),
                        ]),
                    ),
                )
                .set(campaigns::status.eq(CampaignStatus::Running.to_string()))
                .returning(CampaignEntity::as_select())
                .get_result::<CampaignEntity>(conn)
                .optional()?;

                let Some(campaign) = claimed else {
                    return Ok(None);
                };

                if campaign.started_at.is_some() {
                    return Ok(Some(campaign));
                }

                // First start records the start time.
                let campaign = diesel::update(campaigns::table.find(campaign_id))
                    .set(campaigns::started_at.eq(Some(now)))
                    .returning(CampaignEntity::as_select())
                    .get_result::<CampaignEntity>(conn)?;

                Ok(Some(campaign))
            },
        )?;

        Ok(claimed)
    }

    async fn mark_paused(&self, campaign_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = diesel::update(
            campaigns::table
                .find(campaign_id)
                .filter(campaigns::status.eq(CampaignStatus::Running.to_string())),
        )
        .set(campaigns::status.eq(CampaignStatus::Paused.to_string()))
        .execute(&mut conn)?;

        Ok(affected)
    }

    async fn mark_cancelled(&self, campaign_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = diesel::update(
            campaigns::table.find(campaign_id).filter(
                campaigns::status.ne_all([
                    CampaignStatus::Cancelled.to_string(),
                    CampaignStatus::Completed.to_string(),
                ]),
            ),
        )
        .set((
            campaigns::status.eq(CampaignStatus::Cancelled.to_string()),
            campaigns::ended_at.eq(Some(now)),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }

    async fn mark_completed(&self, campaign_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = diesel::update(campaigns::table.find(campaign_id))
            .set((
                campaigns::status.eq(CampaignStatus::Completed.to_string()),
                campaigns::pending_count.eq(0),
                campaigns::ended_at.eq(Some(now)),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    async fn update_progress(
        &self,
        campaign_id: Uuid,
        sent_count: i32,
        failed_count: i32,
        pending_count: i32,
        cursor: i32,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(campaigns::table.find(campaign_id))
            .set((
                campaigns::sent_count.eq(sent_count),
                campaigns::failed_count.eq(failed_count),
                campaigns::pending_count.eq(pending_count),
                campaigns::cursor.eq(cursor),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, campaign_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::delete(
                campaign_log_entries::table
                    .filter(campaign_log_entries::campaign_id.eq(campaign_id)),
            )
            .execute(conn)?;

            diesel::delete(campaigns::table.find(campaign_id)).execute(conn)
        })?;

        Ok(affected)
    }
}
