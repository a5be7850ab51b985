use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    errors::CampaignError,
    repositories::{
        campaign_logs::CampaignLogRepository, campaigns::CampaignRepository,
        progress::ProgressPublisher, transport::MessageTransport,
    },
    value_objects::{
        campaign_progress::{ProgressUpdate, progress_topic},
        campaigns::{CampaignModel, CampaignRecipient},
        enums::campaign_statuses::CampaignStatus,
        message_template::{render_template, select_template},
        phone_number::normalize_whatsapp_address,
    },
};

/// Drains one campaign's pending log entries: selects and renders a template
/// per recipient, hands the message to the transport, persists the outcome
/// and the campaign counters after every item, and publishes progress events.
///
/// The loop holds no state that matters across restarts; the pending rows in
/// the log table are the queue, so a resumed invocation picks up exactly the
/// unprocessed remainder.
pub struct CampaignDispatchUseCase<C, L>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: CampaignLogRepository + Send + Sync + 'static,
{
    campaign_repository: Arc<C>,
    log_repository: Arc<L>,
    transport: Arc<dyn MessageTransport + Send + Sync>,
    progress: Arc<dyn ProgressPublisher + Send + Sync>,
}

impl<C, L> CampaignDispatchUseCase<C, L>
where
    C: CampaignRepository + Send + Sync + 'static,
    L: CampaignLogRepository + Send + Sync + 'static,
{
    pub fn new(
        campaign_repository: Arc<C>,
        log_repository: Arc<L>,
        transport: Arc<dyn MessageTransport + Send + Sync>,
        progress: Arc<dyn ProgressPublisher + Send + Sync>,
    ) -> Self {
        Self {
            campaign_repository,
            log_repository,
            transport,
            progress,
        }
    }

    /// One dispatch invocation. An error that escapes the per-item handling
    /// is unrecoverable here; the campaign is forced to cancelled rather than
    /// left stuck in running.
    pub async fn run(&self, campaign_id: Uuid, cancel: CancellationToken) {
        if let Err(error) = self.process_pending(campaign_id, &cancel).await {
            error!(
                %campaign_id,
                error = ?error,
                "campaign_dispatch: invocation aborted, cancelling campaign"
            );
            if let Err(db_error) = self
                .campaign_repository
                .mark_cancelled(campaign_id, Utc::now())
                .await
            {
                error!(
                    %campaign_id,
                    db_error = ?db_error,
                    "campaign_dispatch: failed to mark campaign cancelled"
                );
            }
        }
    }

    async fn process_pending(&self, campaign_id: Uuid, cancel: &CancellationToken) -> Result<()> {
        let campaign =
            CampaignModel::from_entity(self.campaign_repository.find_by_id(campaign_id).await?)?;
        let pending = self.log_repository.pending_entries(campaign_id).await?;

        if pending.is_empty() {
            info!(%campaign_id, "campaign_dispatch: nothing pending, finishing");
            return self.finish(campaign_id).await;
        }

        info!(
            %campaign_id,
            pending = pending.len(),
            "campaign_dispatch: invocation started"
        );

        let pacing = campaign.pacing();
        let total = campaign.total_recipients;
        let pending_at_start = pending.len() as i32;
        let mut sent_count = campaign.sent_count;
        let mut failed_count = campaign.failed_count;
        let mut cursor = campaign.cursor;
        let mut processed_in_run = 0;
        // Per-invocation counter: the send-N-then-pause cycle restarts on resume.
        let mut sent_in_run = 0;

        for entry in pending {
            // Pause/cancel takes effect here, between items, never mid-send.
            if cancel.is_cancelled() {
                info!(%campaign_id, "campaign_dispatch: cancellation token fired, stopping");
                return Ok(());
            }
            let status = self.campaign_repository.current_status(campaign_id).await?;
            if CampaignStatus::try_from(status.as_str())? != CampaignStatus::Running {
                info!(
                    %campaign_id,
                    status,
                    "campaign_dispatch: campaign left running state, stopping"
                );
                return Ok(());
            }

            if let Some(pause) = pacing.batch_pause(sent_in_run) {
                info!(
                    %campaign_id,
                    pause_secs = pause.as_secs(),
                    "campaign_dispatch: batch pause"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(pause) => {}
                }
            }

            if self.log_repository.mark_sending(entry.id).await? == 0 {
                // Lost the claim; another writer already moved this entry.
                warn!(
                    %campaign_id,
                    entry_id = %entry.id,
                    "campaign_dispatch: entry no longer pending, skipping"
                );
                continue;
            }

            let recipient = campaign
                .recipients
                .iter()
                .find(|recipient| recipient.phone == entry.phone)
                .cloned()
                .unwrap_or_else(|| {
                    CampaignRecipient::from_log_identity(&entry.recipient_name, &entry.phone)
                });

            let (template_index, template) = select_template(&campaign.templates, cursor as usize)
                .ok_or_else(|| anyhow!("campaign {} has no message templates", campaign_id))?;
            let message = if campaign.use_variables {
                render_template(template, &recipient)
            } else {
                template.to_string()
            };

            match self.deliver(&entry.phone, &message).await {
                Ok(()) => {
                    self.log_repository
                        .mark_sent(entry.id, message, template_index as i32, Utc::now())
                        .await?;
                    sent_count += 1;
                    sent_in_run += 1;
                    info!(
                        %campaign_id,
                        recipient = %recipient.name,
                        sent_count,
                        "campaign_dispatch: message sent"
                    );
                    self.publish(
                        campaign_id,
                        ProgressUpdate::sent_item(
                            sent_count,
                            total,
                            recipient.name.clone(),
                            entry.phone.clone(),
                        ),
                    )
                    .await;
                }
                Err(error) => {
                    let error_text = error.to_string();
                    warn!(
                        %campaign_id,
                        phone = %entry.phone,
                        error = %error_text,
                        "campaign_dispatch: send failed"
                    );
                    self.log_repository
                        .mark_failed(entry.id, error_text.clone())
                        .await?;
                    failed_count += 1;
                    self.publish(
                        campaign_id,
                        ProgressUpdate::failed_item(
                            sent_count,
                            failed_count,
                            total,
                            entry.recipient_name.clone(),
                            entry.phone.clone(),
                            error_text,
                        ),
                    )
                    .await;
                }
            }

            processed_in_run += 1;
            cursor += 1;
            self.campaign_repository
                .update_progress(
                    campaign_id,
                    sent_count,
                    failed_count,
                    pending_at_start - processed_in_run,
                    cursor,
                )
                .await?;

            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(pacing.message_interval()) => {}
            }
        }

        let status = self.campaign_repository.current_status(campaign_id).await?;
        if CampaignStatus::try_from(status.as_str())? == CampaignStatus::Running {
            self.finish(campaign_id).await?;
        }

        Ok(())
    }

    /// Per-recipient delivery. Everything that goes wrong in here is a
    /// transport failure: terminal for the entry, non-fatal for the run.
    async fn deliver(&self, phone: &str, message: &str) -> Result<()> {
        let address = normalize_whatsapp_address(phone)
            .map_err(|error| CampaignError::Transport(error.to_string()))?;
        self.transport
            .send_text(&address, message)
            .await
            .map_err(|error| CampaignError::Transport(error.to_string()))?;
        Ok(())
    }

    async fn finish(&self, campaign_id: Uuid) -> Result<()> {
        self.campaign_repository
            .mark_completed(campaign_id, Utc::now())
            .await?;

        let campaign = self.campaign_repository.find_by_id(campaign_id).await?;
        info!(
            %campaign_id,
            sent = campaign.sent_count,
            failed = campaign.failed_count,
            "campaign_dispatch: campaign completed"
        );
        self.publish(
            campaign_id,
            ProgressUpdate::completed(
                campaign.sent_count,
                campaign.failed_count,
                campaign.total_recipients,
            ),
        )
        .await;

        Ok(())
    }

    // Telemetry only; a broken bus must not take the run down with it.
    async fn publish(&self, campaign_id: Uuid, update: ProgressUpdate) {
        if let Err(error) = self
            .progress
            .publish(&progress_topic(campaign_id), &update)
            .await
        {
            warn!(
                %campaign_id,
                error = ?error,
                "campaign_dispatch: progress publish failed"
            );
        }
    }
}
