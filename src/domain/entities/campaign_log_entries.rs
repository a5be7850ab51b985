use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::campaign_log_entries;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = campaign_log_entries)]
pub struct CampaignLogEntity {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub recipient_name: String,
    pub phone: String,
    pub status: String,
    pub rendered_message: Option<String>,
    pub template_index: Option<i32>,
    pub error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = campaign_log_entries)]
pub struct InsertCampaignLogEntity {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub recipient_name: String,
    pub phone: String,
    pub status: String,
    pub rendered_message: Option<String>,
    pub template_index: Option<i32>,
    pub error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
