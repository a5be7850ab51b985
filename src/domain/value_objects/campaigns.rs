use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::campaigns::{CampaignEntity, InsertCampaignEntity},
    value_objects::{
        enums::campaign_statuses::CampaignStatus,
        pacing::{self, PacingPolicy},
    },
};

/// One recipient as stored in the campaign's `recipients` column. Field names
/// follow the frontend payload; the vehicle fields accept both spellings the
/// original data carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignRecipient {
    #[serde(default, rename = "id")]
    pub lead_id: Option<Uuid>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "modeloVeiculo", alias = "modelo_veiculo")]
    pub vehicle_model: Option<String>,
    #[serde(default, rename = "placaVeiculo", alias = "placa_veiculo")]
    pub vehicle_plate: Option<String>,
    #[serde(default, rename = "cidade")]
    pub city: Option<String>,
}

impl CampaignRecipient {
    /// Fallback when a log entry's phone no longer matches any stored
    /// recipient: name and phone from the log, nothing else to substitute.
    pub fn from_log_identity(name: &str, phone: &str) -> Self {
        Self {
            lead_id: None,
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            vehicle_model: None,
            vehicle_plate: None,
            city: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CampaignModel {
    pub id: Uuid,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "consultorId")]
    pub consultant_id: Uuid,
    pub status: CampaignStatus,
    #[serde(rename = "mensagens")]
    pub templates: Vec<String>,
    #[serde(rename = "destinatarios")]
    pub recipients: Vec<CampaignRecipient>,
    #[serde(rename = "totalDestinatarios")]
    pub total_recipients: i32,
    #[serde(rename = "enviados")]
    pub sent_count: i32,
    #[serde(rename = "falhas")]
    pub failed_count: i32,
    #[serde(rename = "pendentes")]
    pub pending_count: i32,
    #[serde(rename = "indiceAtual")]
    pub cursor: i32,
    #[serde(rename = "intervaloSegundos")]
    pub interval_seconds: i32,
    #[serde(rename = "pausarACada")]
    pub pause_every: i32,
    #[serde(rename = "tempoPausaMinutos")]
    pub pause_minutes: i32,
    #[serde(rename = "randomizarOrdem")]
    pub randomize_order: bool,
    #[serde(rename = "pularDuplicados")]
    pub skip_duplicates: bool,
    #[serde(rename = "usarVariaveis")]
    pub use_variables: bool,
    #[serde(rename = "salvarHistorico")]
    pub keep_history: bool,
    #[serde(rename = "notificarConclusao")]
    pub notify_on_completion: bool,
    #[serde(rename = "tempoEstimadoMinutos")]
    pub estimated_minutes: i32,
    #[serde(rename = "dataCriacao")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "dataInicio")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "dataFim")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl CampaignModel {
    pub fn from_entity(entity: CampaignEntity) -> Result<Self> {
        let status = CampaignStatus::try_from(entity.status.as_str())?;
        let templates: Vec<String> = serde_json::from_value(entity.templates)?;
        let recipients: Vec<CampaignRecipient> = serde_json::from_value(entity.recipients)?;

        Ok(Self {
            id: entity.id,
            title: entity.title,
            consultant_id: entity.consultant_id,
            status,
            templates,
            recipients,
            total_recipients: entity.total_recipients,
            sent_count: entity.sent_count,
            failed_count: entity.failed_count,
            pending_count: entity.pending_count,
            cursor: entity.cursor,
            interval_seconds: entity.interval_seconds,
            pause_every: entity.pause_every,
            pause_minutes: entity.pause_minutes,
            randomize_order: entity.randomize_order,
            skip_duplicates: entity.skip_duplicates,
            use_variables: entity.use_variables,
            keep_history: entity.keep_history,
            notify_on_completion: entity.notify_on_completion,
            estimated_minutes: entity.estimated_minutes,
            created_at: entity.created_at,
            started_at: entity.started_at,
            ended_at: entity.ended_at,
        })
    }

    pub fn pacing(&self) -> PacingPolicy {
        PacingPolicy {
            interval_seconds: self.interval_seconds,
            pause_every: self.pause_every,
            pause_minutes: self.pause_minutes,
        }
    }
}

/// Creation request as the frontend sends it; the pacing and flag defaults
/// match the original service.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CreateCampaignModel {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "mensagens")]
    pub templates: Vec<String>,
    #[serde(rename = "destinatarios")]
    pub recipients: Vec<CampaignRecipient>,
    #[serde(rename = "intervaloSegundos", default = "default_interval_seconds")]
    pub interval_seconds: i32,
    #[serde(rename = "pausarACada", default = "default_pause_every")]
    pub pause_every: i32,
    #[serde(rename = "tempoPausaMinutos", default = "default_pause_minutes")]
    pub pause_minutes: i32,
    #[serde(rename = "randomizarOrdem", default = "default_flag_on")]
    pub randomize_order: bool,
    #[serde(rename = "pularDuplicados", default = "default_flag_on")]
    pub skip_duplicates: bool,
    #[serde(rename = "usarVariaveis", default = "default_flag_on")]
    pub use_variables: bool,
    #[serde(rename = "salvarHistorico", default = "default_flag_on")]
    pub keep_history: bool,
    #[serde(rename = "notificarConclusao", default = "default_flag_on")]
    pub notify_on_completion: bool,
}

fn default_interval_seconds() -> i32 {
    3
}

fn default_pause_every() -> i32 {
    50
}

fn default_pause_minutes() -> i32 {
    5
}

fn default_flag_on() -> bool {
    true
}

impl CreateCampaignModel {
    /// `recipients` is passed separately because duplicate handling may have
    /// reduced the submitted list.
    pub fn to_entity(
        &self,
        campaign_id: Uuid,
        consultant_id: Uuid,
        recipients: &[CampaignRecipient],
        now: DateTime<Utc>,
    ) -> Result<InsertCampaignEntity> {
        let total_recipients = recipients.len() as i32;

        Ok(InsertCampaignEntity {
            id: campaign_id,
            title: self.title.clone(),
            consultant_id,
            status: CampaignStatus::Draft.to_string(),
            templates: serde_json::to_value(&self.templates)?,
            recipients: serde_json::to_value(recipients)?,
            total_recipients,
            sent_count: 0,
            failed_count: 0,
            pending_count: total_recipients,
            cursor: 0,
            interval_seconds: self.interval_seconds,
            pause_every: self.pause_every,
            pause_minutes: self.pause_minutes,
            randomize_order: self.randomize_order,
            skip_duplicates: self.skip_duplicates,
            use_variables: self.use_variables,
            keep_history: self.keep_history,
            notify_on_completion: self.notify_on_completion,
            estimated_minutes: pacing::estimated_duration_minutes(
                recipients.len(),
                self.interval_seconds,
            ),
            created_at: now,
            started_at: None,
            ended_at: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CampaignStatistics {
    pub total: i32,
    #[serde(rename = "enviados")]
    pub sent: i32,
    #[serde(rename = "falhas")]
    pub failed: i32,
    #[serde(rename = "pendentes")]
    pub pending: i32,
    #[serde(rename = "porStatus")]
    pub by_status: HashMap<String, i64>,
}
