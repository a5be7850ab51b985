pub mod campaign_log_entries;
pub mod campaigns;
