pub mod campaign_statuses;
pub mod log_entry_statuses;
