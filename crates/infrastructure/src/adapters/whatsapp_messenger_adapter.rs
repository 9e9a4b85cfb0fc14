//! WhatsApp messenger adapter
//!
//! Implements the `MessengerPort` trait using the WhatsApp integration crate.

use application::error::ApplicationError;
use application::ports::{MessengerPort, SentMessage};
use async_trait::async_trait;
use domain::OutboundMessage;
use integration_whatsapp::{WhatsAppClient, WhatsAppClientConfig, WhatsAppError};
use tracing::{debug, instrument};

/// Adapter that implements `MessengerPort` using `WhatsAppClient`
#[derive(Debug)]
pub struct WhatsAppMessengerAdapter {
    /// The underlying WhatsApp client
    client: WhatsAppClient,
}

impl WhatsAppMessengerAdapter {
    /// Create a new WhatsApp messenger adapter
    ///
    /// # Errors
    /// Returns an error if the client configuration is invalid.
    pub fn new(config: WhatsAppClientConfig) -> Result<Self, WhatsAppError> {
        let client = WhatsAppClient::new(config)?;
        Ok(Self { client })
    }
}

/// Map client errors onto application errors, keeping the vendor status class
pub fn map_whatsapp_error(err: WhatsAppError) -> ApplicationError {
    match err {
        WhatsAppError::Authentication(msg) => ApplicationError::Authentication(msg),
        WhatsAppError::NotFound(msg) => ApplicationError::NotFound(msg),
        WhatsAppError::BadRequest(msg) => ApplicationError::BadRequest(msg),
        WhatsAppError::Configuration(msg) => ApplicationError::Configuration(msg),
        e @ (WhatsAppError::Request(_) | WhatsAppError::Api { .. } | WhatsAppError::Serialization(_)) => {
            ApplicationError::ExternalService(format!("WhatsApp send failed: {e}"))
        },
    }
}

#[async_trait]
impl MessengerPort for WhatsAppMessengerAdapter {
    #[instrument(skip(self, message), fields(recipient = %message.recipient, kind = message.kind()))]
    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, ApplicationError> {
        let response = self.client.send(message).await.map_err(map_whatsapp_error)?;

        let message_id = response.message_id().map(str::to_string).ok_or_else(|| {
            ApplicationError::ExternalService("No message ID in response".to_string())
        })?;

        debug!(message_id = %message_id, "WhatsApp message sent");
        Ok(SentMessage {
            message_id,
            wa_id: response.wa_id().map(str::to_string),
        })
    }

    #[instrument(skip(self))]
    async fn is_available(&self) -> bool {
        self.client.is_available().await
    }

    fn provider_name(&self) -> &'static str {
        "WhatsApp Cloud API"
    }
}
