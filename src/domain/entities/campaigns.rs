use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::campaigns;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = campaigns)]
pub struct CampaignEntity {
    pub id: Uuid,
    pub title: String,
    pub consultant_id: Uuid,
    pub status: String,
    pub templates: Value,
    pub recipients: Value,
    pub total_recipients: i32,
    pub sent_count: i32,
    pub failed_count: i32,
    pub pending_count: i32,
    pub cursor: i32,
    pub interval_seconds: i32,
    pub pause_every: i32,
    pub pause_minutes: i32,
    pub randomize_order: bool,
    pub skip_duplicates: bool,
    pub use_variables: bool,
    pub keep_history: bool,
    pub notify_on_completion: bool,
    pub estimated_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = campaigns)]
pub struct InsertCampaignEntity {
    pub id: Uuid,
    pub title: String,
    pub consultant_id: Uuid,
    pub status: String,
    pub templates: Value,
    pub recipients: Value,
    pub total_recipients: i32,
    pub sent_count: i32,
    pub failed_count: i32,
    pub pending_count: i32,
    pub cursor: i32,
    pub interval_seconds: i32,
    pub pause_every: i32,
    pub pause_minutes: i32,
    pub randomize_order: bool,
    pub skip_duplicates: bool,
    pub use_variables: bool,
    pub keep_history: bool,
    pub notify_on_completion: bool,
    pub estimated_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}
