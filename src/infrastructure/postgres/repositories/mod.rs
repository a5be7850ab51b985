pub mod campaign_logs;
pub mod campaigns;
