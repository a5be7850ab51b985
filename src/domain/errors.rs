use thiserror::Error;

/// Typed failure classes surfaced to callers of the campaign use cases.
/// Anything outside these classes propagates as a plain `anyhow::Error` and
/// is treated as a system error by the dispatch loop.
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid campaign state: {0}")]
    InvalidState(String),

    #[error("transport send failed: {0}")]
    Transport(String),
}
