use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Wire statuses the existing frontend listens for.
pub const SENT_WIRE_STATUS: &str = "enviado";
pub const FAILED_WIRE_STATUS: &str = "falha";
pub const COMPLETED_WIRE_STATUS: &str = "concluida";

/// Topic a consumer subscribes to for one campaign's progress stream.
pub fn progress_topic(campaign_id: Uuid) -> String {
    format!("campaign:{}:progress", campaign_id)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LastRecipient {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    pub status: String,
    #[serde(default, rename = "erro", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressUpdate {
    #[serde(rename = "enviados")]
    pub sent: i32,
    #[serde(default, rename = "falhas", skip_serializing_if = "Option::is_none")]
    pub failed: Option<i32>,
    pub total: i32,
    #[serde(default, rename = "ultimo", skip_serializing_if = "Option::is_none")]
    pub last: Option<LastRecipient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ProgressUpdate {
    pub fn sent_item(sent: i32, total: i32, name: String, phone: String) -> Self {
        Self {
            sent,
            failed: None,
            total,
            last: Some(LastRecipient {
                name,
                phone,
                status: SENT_WIRE_STATUS.to_string(),
                error: None,
            }),
            status: None,
        }
    }

    pub fn failed_item(
        sent: i32,
        failed: i32,
        total: i32,
        name: String,
        phone: String,
        error: String,
    ) -> Self {
        Self {
            sent,
            failed: Some(failed),
            total,
            last: Some(LastRecipient {
                name,
                phone,
                status: FAILED_WIRE_STATUS.to_string(),
                error: Some(error),
            }),
            status: None,
        }
    }

    pub fn completed(sent: i32, failed: i32, total: i32) -> Self {
        Self {
            sent,
            failed: Some(failed),
            total,
            last: None,
            status: Some(COMPLETED_WIRE_STATUS.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_is_keyed_by_campaign_id() {
        let campaign_id = Uuid::new_v4();
        assert_eq!(
            progress_topic(campaign_id),
            format!("campaign:{}:progress", campaign_id)
        );
    }

    #[test]
    fn sent_payload_uses_frontend_field_names() {
        let update = ProgressUpdate::sent_item(2, 10, "Ana".to_string(), "11988887777".to_string());
        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(json["enviados"], 2);
        assert_eq!(json["total"], 10);
        assert_eq!(json["ultimo"]["nome"], "Ana");
        assert_eq!(json["ultimo"]["status"], "enviado");
        assert!(json.get("falhas").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn failure_payload_carries_error_text() {
        let update = ProgressUpdate::failed_item(
            2,
            1,
            10,
            "Ana".to_string(),
            "11988887777".to_string(),
            "transport down".to_string(),
        );
        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(json["falhas"], 1);
        assert_eq!(json["ultimo"]["status"], "falha");
        assert_eq!(json["ultimo"]["erro"], "transport down");
    }
}
