//! Messenger port - outbound messaging provider
//!
//! Abstracts the vendor REST API so the dispatch use case can be exercised
//! without network access.

use async_trait::async_trait;
use domain::OutboundMessage;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Acknowledgement returned by the provider for one sent message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    /// Provider message ID (e.g. `wamid.…`)
    pub message_id: String,
    /// Recipient as resolved by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
}

/// Port for sending messages through a messaging provider
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessengerPort: Send + Sync {
    /// Send one message; exactly one HTTP call per invocation
    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, ApplicationError>;

    /// Lightweight read-only availability lookup
    async fn is_available(&self) -> bool;

    /// Human-readable provider name used in "not supported" results
    fn provider_name(&self) -> &'static str;
}
