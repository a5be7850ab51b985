//! In-memory stand-ins for the persistence, transport and event-bus seams,
//! shared by the dispatch and lifecycle scenario tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{
    entities::{
        campaign_log_entries::{CampaignLogEntity, InsertCampaignLogEntity},
        campaigns::{CampaignEntity, InsertCampaignEntity},
    },
    repositories::{
        campaign_logs::CampaignLogRepository, campaigns::CampaignRepository,
        progress::ProgressPublisher, transport::MessageTransport,
    },
    value_objects::{
        campaign_progress::ProgressUpdate,
        campaigns::CampaignRecipient,
        enums::{campaign_statuses::CampaignStatus, log_entry_statuses::LogEntryStatus},
    },
};

#[derive(Default)]
pub struct InMemoryStore {
    pub campaigns: Mutex<HashMap<Uuid, CampaignEntity>>,
    pub entries: Mutex<Vec<CampaignLogEntity>>,
    pub events: Mutex<Vec<(String, ProgressUpdate)>>,
    pub sent_messages: Mutex<Vec<(String, String)>>,
    /// Every (sent, failed, pending, cursor) tuple persisted via
    /// `update_progress`, for invariant assertions.
    pub progress_history: Mutex<Vec<(i32, i32, i32, i32)>>,
}

pub fn recipient(name: &str, phone: &str) -> CampaignRecipient {
    CampaignRecipient {
        lead_id: None,
        name: name.to_string(),
        phone: phone.to_string(),
        email: None,
        vehicle_model: None,
        vehicle_plate: None,
        city: None,
    }
}

pub fn campaign_entity(
    campaign_id: Uuid,
    status: CampaignStatus,
    templates: &[&str],
    recipients: &[CampaignRecipient],
    interval_seconds: i32,
    pause_every: i32,
    pause_minutes: i32,
) -> CampaignEntity {
    let total_recipients = recipients.len() as i32;

    CampaignEntity {
        id: campaign_id,
        title: "Campanha de teste".to_string(),
        consultant_id: Uuid::new_v4(),
        status: status.to_string(),
        templates: serde_json::to_value(templates).unwrap(),
        recipients: serde_json::to_value(recipients).unwrap(),
        total_recipients,
        sent_count: 0,
        failed_count: 0,
        pending_count: total_recipients,
        cursor: 0,
        interval_seconds,
        pause_every,
        pause_minutes,
        randomize_order: false,
        skip_duplicates: true,
        use_variables: true,
        keep_history: true,
        notify_on_completion: true,
        estimated_minutes: 0,
        created_at: Utc::now(),
        started_at: None,
        ended_at: None,
    }
}

pub fn pending_entries_for(
    campaign: &CampaignEntity,
    recipients: &[CampaignRecipient],
) -> Vec<CampaignLogEntity> {
    let now = Utc::now();
    recipients
        .iter()
        .enumerate()
        .map(|(position, recipient)| CampaignLogEntity {
            id: Uuid::new_v4(),
            campaign_id: campaign.id,
            lead_id: recipient.lead_id,
            recipient_name: recipient.name.clone(),
            phone: recipient.phone.clone(),
            status: LogEntryStatus::Pending.to_string(),
            rendered_message: None,
            template_index: None,
            error: None,
            sent_at: None,
            created_at: now + Duration::microseconds(position as i64),
        })
        .collect()
}

pub fn seed(store: &InMemoryStore, campaign: CampaignEntity, entries: Vec<CampaignLogEntity>) {
    store
        .campaigns
        .lock()
        .unwrap()
        .insert(campaign.id, campaign);
    store.entries.lock().unwrap().extend(entries);
}

pub fn entity_from_insert(insert: &InsertCampaignEntity) -> CampaignEntity {
    CampaignEntity {
        id: insert.id,
        title: insert.title.clone(),
        consultant_id: insert.consultant_id,
        status: insert.status.clone(),
        templates: insert.templates.clone(),
        recipients: insert.recipients.clone(),
        total_recipients: insert.total_recipients,
        sent_count: insert.sent_count,
        failed_count: insert.failed_count,
        pending_count: insert.pending_count,
        cursor: insert.cursor,
        interval_seconds: insert.interval_seconds,
        pause_every: insert.pause_every,
        pause_minutes: insert.pause_minutes,
        randomize_order: insert.randomize_order,
        skip_duplicates: insert.skip_duplicates,
        use_variables: insert.use_variables,
        keep_history: insert.keep_history,
        notify_on_completion: insert.notify_on_completion,
        estimated_minutes: insert.estimated_minutes,
        created_at: insert.created_at,
        started_at: insert.started_at,
        ended_at: insert.ended_at,
    }
}

pub fn log_entity_from_insert(insert: &InsertCampaignLogEntity) -> CampaignLogEntity {
    CampaignLogEntity {
        id: insert.id,
        campaign_id: insert.campaign_id,
        lead_id: insert.lead_id,
        recipient_name: insert.recipient_name.clone(),
        phone: insert.phone.clone(),
        status: insert.status.clone(),
        rendered_message: insert.rendered_message.clone(),
        template_index: insert.template_index,
        error: insert.error.clone(),
        sent_at: insert.sent_at,
        created_at: insert.created_at,
    }
}

pub struct InMemoryCampaignRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryCampaignRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    async fn create(
        &self,
        insert_campaign_entity: InsertCampaignEntity,
        insert_log_entities: Vec<InsertCampaignLogEntity>,
    ) -> Result<CampaignEntity> {
        let campaign = entity_from_insert(&insert_campaign_entity);
        self.store
            .campaigns
            .lock()
            .unwrap()
            .insert(campaign.id, campaign.clone());
        self.store
            .entries
            .lock()
            .unwrap()
            .extend(insert_log_entities.iter().map(log_entity_from_insert));
        Ok(campaign)
    }

    async fn find_by_id(&self, campaign_id: Uuid) -> Result<CampaignEntity> {
        match self.store.campaigns.lock().unwrap().get(&campaign_id) {
            Some(campaign) => Ok(campaign.clone()),
            None => bail!("campaign not found: {}", campaign_id),
        }
    }

    async fn list_by_consultant(
        &self,
        consultant_id: Uuid,
        status: Option<CampaignStatus>,
    ) -> Result<Vec<CampaignEntity>> {
        let campaigns = self.store.campaigns.lock().unwrap();
        Ok(campaigns
            .values()
            .filter(|campaign| campaign.consultant_id == consultant_id)
            .filter(|campaign| {
                status
                    .map(|status| campaign.status == status.to_string())
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn current_status(&self, campaign_id: Uuid) -> Result<String> {
        self.find_by_id(campaign_id)
            .await
            .map(|campaign| campaign.status)
    }

    async fn claim_for_run(
        &self,
        campaign_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<CampaignEntity>> {
        let mut campaigns = self.store.campaigns.lock().unwrap();
        let Some(campaign) = campaigns.get_mut(&campaign_id) else {
            bail!("campaign not found: {}", campaign_id);
        };

        let claimable = campaign.status == CampaignStatus::Draft.to_string()
            || campaign.status == CampaignStatus::Paused.to_string();
        if !claimable {
            return Ok(None);
        }

        campaign.status = CampaignStatus::Running.to_string();
        if campaign.started_at.is_none() {
            campaign.started_at = Some(now);
        }
        Ok(Some(campaign.clone()))
    }

    async fn mark_paused(&self, campaign_id: Uuid) -> Result<usize> {
        let mut campaigns = self.store.campaigns.lock().unwrap();
        match campaigns.get_mut(&campaign_id) {
            Some(campaign) if campaign.status == CampaignStatus::Running.to_string() => {
                campaign.status = CampaignStatus::Paused.to_string();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn mark_cancelled(&self, campaign_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let mut campaigns = self.store.campaigns.lock().unwrap();
        match campaigns.get_mut(&campaign_id) {
            Some(campaign)
                if campaign.status != CampaignStatus::Cancelled.to_string()
                    && campaign.status != CampaignStatus::Completed.to_string() =>
            {
                campaign.status = CampaignStatus::Cancelled.to_string();
                campaign.ended_at = Some(now);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn mark_completed(&self, campaign_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let mut campaigns = self.store.campaigns.lock().unwrap();
        match campaigns.get_mut(&campaign_id) {
            Some(campaign) => {
                campaign.status = CampaignStatus::Completed.to_string();
                campaign.pending_count = 0;
                campaign.ended_at = Some(now);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_progress(
        &self,
        campaign_id: Uuid,
        sent_count: i32,
        failed_count: i32,
        pending_count: i32,
        cursor: i32,
    ) -> Result<()> {
        let mut campaigns = self.store.campaigns.lock().unwrap();
        if let Some(campaign) = campaigns.get_mut(&campaign_id) {
            campaign.sent_count = sent_count;
            campaign.failed_count = failed_count;
            campaign.pending_count = pending_count;
            campaign.cursor = cursor;
        }
        self.store
            .progress_history
            .lock()
            .unwrap()
            .push((sent_count, failed_count, pending_count, cursor));
        Ok(())
    }

    async fn delete(&self, campaign_id: Uuid) -> Result<usize> {
        self.store
            .entries
            .lock()
            .unwrap()
            .retain(|entry| entry.campaign_id != campaign_id);
        let removed = self.store.campaigns.lock().unwrap().remove(&campaign_id);
        Ok(removed.map(|_| 1).unwrap_or(0))
    }
}

pub struct InMemoryCampaignLogRepository {
    store: Arc<InMemoryStore>,
    pub fail_mark_sending: bool,
}

impl InMemoryCampaignLogRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self {
            store,
            fail_mark_sending: false,
        }
    }
}

#[async_trait]
impl CampaignLogRepository for InMemoryCampaignLogRepository {
    async fn pending_entries(&self, campaign_id: Uuid) -> Result<Vec<CampaignLogEntity>> {
        let mut entries: Vec<CampaignLogEntity> = self
            .store
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.campaign_id == campaign_id)
            .filter(|entry| entry.status == LogEntryStatus::Pending.to_string())
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.created_at);
        Ok(entries)
    }

    async fn mark_sending(&self, entry_id: Uuid) -> Result<usize> {
        if self.fail_mark_sending {
            bail!("database connection lost");
        }
        let mut entries = self.store.entries.lock().unwrap();
        match entries
            .iter_mut()
            .find(|entry| entry.id == entry_id && entry.status == "pending")
        {
            Some(entry) => {
                entry.status = LogEntryStatus::Sending.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn mark_sent(
        &self,
        entry_id: Uuid,
        rendered_message: String,
        template_index: i32,
        sent_at: DateTime<Utc>,
    ) -> Result<usize> {
        let mut entries = self.store.entries.lock().unwrap();
        match entries
            .iter_mut()
            .find(|entry| entry.id == entry_id && entry.status == "sending")
        {
            Some(entry) => {
                entry.status = LogEntryStatus::Sent.to_string();
                entry.rendered_message = Some(rendered_message);
                entry.template_index = Some(template_index);
                entry.sent_at = Some(sent_at);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn mark_failed(&self, entry_id: Uuid, error: String) -> Result<usize> {
        let mut entries = self.store.entries.lock().unwrap();
        match entries
            .iter_mut()
            .find(|entry| entry.id == entry_id && entry.status == "sending")
        {
            Some(entry) => {
                entry.status = LogEntryStatus::Failed.to_string();
                entry.error = Some(error);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list_for_campaign(
        &self,
        campaign_id: Uuid,
        status: Option<LogEntryStatus>,
    ) -> Result<Vec<CampaignLogEntity>> {
        let mut entries: Vec<CampaignLogEntity> = self
            .store
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.campaign_id == campaign_id)
            .filter(|entry| {
                status
                    .map(|status| entry.status == status.to_string())
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.created_at);
        Ok(entries)
    }

    async fn count_by_status(&self, campaign_id: Uuid) -> Result<Vec<(String, i64)>> {
        let entries = self.store.entries.lock().unwrap();
        let mut counts: HashMap<String, i64> = HashMap::new();
        for entry in entries.iter().filter(|entry| entry.campaign_id == campaign_id) {
            *counts.entry(entry.status.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

/// Records every delivered message; can fail selected phones and flip a
/// campaign's status after the Nth delivery to emulate an out-of-band
/// cancel arriving between items.
pub struct FakeTransport {
    store: Arc<InMemoryStore>,
    pub failing_phones: Vec<String>,
    pub cancel_campaign_after: Option<(Uuid, usize)>,
}

impl FakeTransport {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self {
            store,
            failing_phones: Vec::new(),
            cancel_campaign_after: None,
        }
    }
}

#[async_trait]
impl MessageTransport for FakeTransport {
    async fn send_text(&self, address: &str, text: &str) -> Result<()> {
        if self
            .failing_phones
            .iter()
            .any(|phone| address.contains(phone.as_str()))
        {
            bail!("WhatsApp session is not connected");
        }

        let delivered = {
            let mut sent = self.store.sent_messages.lock().unwrap();
            sent.push((address.to_string(), text.to_string()));
            sent.len()
        };

        if let Some((campaign_id, after)) = self.cancel_campaign_after {
            if delivered == after {
                if let Some(campaign) =
                    self.store.campaigns.lock().unwrap().get_mut(&campaign_id)
                {
                    campaign.status = CampaignStatus::Cancelled.to_string();
                    campaign.ended_at = Some(Utc::now());
                }
            }
        }

        Ok(())
    }
}

pub struct FakePublisher {
    store: Arc<InMemoryStore>,
}

impl FakePublisher {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProgressPublisher for FakePublisher {
    async fn publish(&self, topic: &str, update: &ProgressUpdate) -> Result<()> {
        self.store
            .events
            .lock()
            .unwrap()
            .push((topic.to_string(), update.clone()));
        Ok(())
    }
}
