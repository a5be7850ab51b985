pub mod campaign_logs;
pub mod campaigns;
pub mod progress;
pub mod transport;
