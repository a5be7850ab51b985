use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

/// Seam to the WhatsApp client owned by the embedding service. The address
/// is the normalized form produced by
/// `domain::value_objects::phone_number::normalize_whatsapp_address`.
#[async_trait]
#[automock]
pub trait MessageTransport {
    async fn send_text(&self, address: &str, text: &str) -> Result<()>;
}
