use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::campaign_log_entries::CampaignLogEntity,
    value_objects::enums::log_entry_statuses::LogEntryStatus,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CampaignLogModel {
    pub id: Uuid,
    #[serde(rename = "campanhaId")]
    pub campaign_id: Uuid,
    #[serde(rename = "leadId")]
    pub lead_id: Option<Uuid>,
    #[serde(rename = "nomeDestinatario")]
    pub recipient_name: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    pub status: LogEntryStatus,
    #[serde(rename = "mensagemEnviada")]
    pub rendered_message: Option<String>,
    #[serde(rename = "mensagemIndex")]
    pub template_index: Option<i32>,
    #[serde(rename = "erro")]
    pub error: Option<String>,
    #[serde(rename = "dataEnvio")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(rename = "dataCriacao")]
    pub created_at: DateTime<Utc>,
}

impl CampaignLogModel {
    pub fn from_entity(entity: CampaignLogEntity) -> Result<Self> {
        let status = LogEntryStatus::try_from(entity.status.as_str())?;

        Ok(Self {
            id: entity.id,
            campaign_id: entity.campaign_id,
            lead_id: entity.lead_id,
            recipient_name: entity.recipient_name,
            phone: entity.phone,
            status,
            rendered_message: entity.rendered_message,
            template_index: entity.template_index,
            error: entity.error,
            sent_at: entity.sent_at,
            created_at: entity.created_at,
        })
    }
}
