use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::application::usercases::{
    campaign_dispatch::CampaignDispatchUseCase, dispatch_registry::DispatchRegistry,
};
use crate::domain::{
    entities::campaign_log_entries::InsertCampaignLogEntity,
    errors::CampaignError,
    repositories::{campaign_logs::CampaignLogRepository, campaigns::CampaignRepository},
    value_objects::{
        campaign_logs::CampaignLogModel,
        campaigns::{CampaignModel, CampaignRecipient, CampaignStatistics, CreateCampaignModel},
        enums::{campaign_statuses::CampaignStatus, log_entry_statuses::LogEntryStatus},
        phone_number::phone_digits,
    },
};

/// Owns campaign status transitions and the dispatch task that a start
/// spins up. Everything else is read-side plumbing for the control surface.
pub struct CampaignLifecycleUseCase<C, L>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: CampaignLogRepository + Send + Sync + 'static,
{
    campaign_repository: Arc<C>,
    log_repository: Arc<L>,
    dispatcher: Arc<CampaignDispatchUseCase<C, L>>,
    registry: Arc<DispatchRegistry>,
}

impl<C, L> CampaignLifecycleUseCase<C, L>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: CampaignLogRepository + Send + Sync + 'static,
{
    pub fn new(
        campaign_repository: Arc<C>,
        log_repository: Arc<L>,
        dispatcher: Arc<CampaignDispatchUseCase<C, L>>,
        registry: Arc<DispatchRegistry>,
    ) -> Self {
        Self {
            campaign_repository,
            log_repository,
            dispatcher,
            registry,
        }
    }

    pub async fn create(
        &self,
        consultant_id: Uuid,
        request: CreateCampaignModel,
    ) -> Result<CampaignModel> {
        if request.title.trim().is_empty() {
            return Err(CampaignError::Validation("campaign title is required".to_string()).into());
        }
        if request.templates.is_empty() {
            return Err(CampaignError::Validation(
                "at least one message template is required".to_string(),
            )
            .into());
        }
        if request.recipients.is_empty() {
            return Err(
                CampaignError::Validation("at least one recipient is required".to_string()).into(),
            );
        }

        let recipients = resolve_duplicates(&request)?;
        let campaign_id = Uuid::new_v4();
        let now = Utc::now();

        let insert_campaign = request.to_entity(campaign_id, consultant_id, &recipients, now)?;
        let insert_logs: Vec<InsertCampaignLogEntity> = recipients
            .iter()
            .enumerate()
            .map(|(position, recipient)| InsertCampaignLogEntity {
                id: Uuid::new_v4(),
                campaign_id,
                lead_id: recipient.lead_id,
                recipient_name: recipient.name.clone(),
                phone: recipient.phone.clone(),
                status: LogEntryStatus::Pending.to_string(),
                rendered_message: None,
                template_index: None,
                error: None,
                sent_at: None,
                // Staggered so the pending query's creation-time order is the
                // submission order even within one bulk insert.
                created_at: now + chrono::Duration::microseconds(position as i64),
            })
            .collect();

        let campaign = self
            .campaign_repository
            .create(insert_campaign, insert_logs)
            .await?;

        info!(
            %campaign_id,
            %consultant_id,
            total = campaign.total_recipients,
            "campaign_lifecycle: campaign created"
        );

        CampaignModel::from_entity(campaign)
    }

    /// Claims the campaign (draft|paused -> running) and spawns its dispatch
    /// task. The database claim is the lease against duplicate starts; the
    /// registry slot is the in-process fast path for the same guarantee.
    pub async fn start(&self, campaign_id: Uuid) -> Result<()> {
        let Some(cancel) = self.registry.begin(campaign_id) else {
            return Err(CampaignError::InvalidState(format!(
                "campaign {} already has a dispatch run in progress",
                campaign_id
            ))
            .into());
        };

        let claimed = match self
            .campaign_repository
            .claim_for_run(campaign_id, Utc::now())
            .await
        {
            Ok(claimed) => claimed,
            Err(error) => {
                self.registry.finish(campaign_id);
                return Err(error);
            }
        };

        let Some(campaign) = claimed else {
            self.registry.finish(campaign_id);
            let campaign = self.campaign_repository.find_by_id(campaign_id).await?;
            return Err(CampaignError::InvalidState(format!(
                "campaign {} cannot start from status {}",
                campaign_id, campaign.status
            ))
            .into());
        };

        info!(
            %campaign_id,
            title = %campaign.title,
            pending = campaign.pending_count,
            "campaign_lifecycle: dispatch starting"
        );

        let dispatcher = Arc::clone(&self.dispatcher);
        let registry = Arc::clone(&self.registry);
        let run_token = cancel.clone();
        let handle = tokio::spawn(async move {
            dispatcher.run(campaign_id, run_token).await;
            registry.finish(campaign_id);
        });
        self.registry.attach(campaign_id, handle);

        Ok(())
    }

    /// Takes effect at the next dispatch iteration boundary, never mid-send.
    pub async fn pause(&self, campaign_id: Uuid) -> Result<()> {
        if self.campaign_repository.mark_paused(campaign_id).await? == 0 {
            let campaign = self.campaign_repository.find_by_id(campaign_id).await?;
            return Err(CampaignError::InvalidState(format!(
                "campaign {} is not running (status {})",
                campaign_id, campaign.status
            ))
            .into());
        }

        info!(%campaign_id, "campaign_lifecycle: campaign paused");
        Ok(())
    }

    pub async fn cancel(&self, campaign_id: Uuid) -> Result<()> {
        if self
            .campaign_repository
            .mark_cancelled(campaign_id, Utc::now())
            .await?
            == 0
        {
            let campaign = self.campaign_repository.find_by_id(campaign_id).await?;
            return Err(CampaignError::InvalidState(format!(
                "campaign {} is already {}",
                campaign_id, campaign.status
            ))
            .into());
        }

        // Wake the loop out of any pacing sleep so it sees the new status.
        self.registry.cancel(campaign_id);

        info!(%campaign_id, "campaign_lifecycle: campaign cancelled");
        Ok(())
    }

    /// A running campaign must be cancelled first; everything else deletes
    /// the campaign together with its log entries.
    pub async fn delete(&self, campaign_id: Uuid) -> Result<()> {
        let campaign = self.campaign_repository.find_by_id(campaign_id).await?;
        if campaign.status == CampaignStatus::Running.to_string() {
            return Err(CampaignError::InvalidState(format!(
                "campaign {} is running; cancel it before deleting",
                campaign_id
            ))
            .into());
        }

        self.campaign_repository.delete(campaign_id).await?;
        info!(%campaign_id, "campaign_lifecycle: campaign deleted");
        Ok(())
    }

    pub async fn find(&self, campaign_id: Uuid) -> Result<CampaignModel> {
        let campaign = self.campaign_repository.find_by_id(campaign_id).await?;
        CampaignModel::from_entity(campaign)
    }

    pub async fn list(
        &self,
        consultant_id: Uuid,
        status: Option<CampaignStatus>,
    ) -> Result<Vec<CampaignModel>> {
        let campaigns = self
            .campaign_repository
            .list_by_consultant(consultant_id, status)
            .await?;
        campaigns.into_iter().map(CampaignModel::from_entity).collect()
    }

    pub async fn logs(
        &self,
        campaign_id: Uuid,
        status: Option<LogEntryStatus>,
    ) -> Result<Vec<CampaignLogModel>> {
        self.campaign_repository.find_by_id(campaign_id).await?;
        let entries = self
            .log_repository
            .list_for_campaign(campaign_id, status)
            .await?;
        entries.into_iter().map(CampaignLogModel::from_entity).collect()
    }

    pub async fn statistics(&self, campaign_id: Uuid) -> Result<CampaignStatistics> {
        let campaign = self.campaign_repository.find_by_id(campaign_id).await?;
        let counts = self.log_repository.count_by_status(campaign_id).await?;

        Ok(CampaignStatistics {
            total: campaign.total_recipients,
            sent: campaign.sent_count,
            failed: campaign.failed_count,
            pending: campaign.pending_count,
            by_status: counts.into_iter().collect(),
        })
    }
}

/// One log entry per (campaign, recipient): duplicates by phone digits are
/// either collapsed (skip_duplicates on, keeping the first occurrence) or
/// rejected outright.
fn resolve_duplicates(request: &CreateCampaignModel) -> Result<Vec<CampaignRecipient>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut recipients = Vec::with_capacity(request.recipients.len());

    for recipient in &request.recipients {
        if !seen.insert(phone_digits(&recipient.phone)) {
            if request.skip_duplicates {
                continue;
            }
            return Err(CampaignError::Validation(format!(
                "duplicate recipient phone: {}",
                recipient.phone
            ))
            .into());
        }
        recipients.push(recipient.clone());
    }

    Ok(recipients)
}
