use std::fmt::Display;
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogEntryStatus {
    #[default]
    Pending,
    Sending,
    Sent,
    Failed,
}

impl LogEntryStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LogEntryStatus::Sent | LogEntryStatus::Failed)
    }
}

impl Display for LogEntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            LogEntryStatus::Pending => "pending",
            LogEntryStatus::Sending => "sending",
            LogEntryStatus::Sent => "sent",
            LogEntryStatus::Failed => "failed",
        };
        write!(f, "{}", status)
    }
}

impl TryFrom<&str> for LogEntryStatus {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(LogEntryStatus::Pending),
            "sending" => Ok(LogEntryStatus::Sending),
            "sent" => Ok(LogEntryStatus::Sent),
            "failed" => Ok(LogEntryStatus::Failed),
            _ => Err(anyhow::anyhow!("unknown log entry status: {}", value)),
        }
    }
}
