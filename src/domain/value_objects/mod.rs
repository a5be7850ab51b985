pub mod campaign_logs;
pub mod campaign_progress;
pub mod campaigns;
pub mod enums;
pub mod message_template;
pub mod pacing;
pub mod phone_number;
