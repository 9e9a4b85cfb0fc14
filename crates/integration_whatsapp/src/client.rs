//! WhatsApp client for sending messages
//!
//! Uses the Meta Graph API (Cloud API) to send WhatsApp messages.

use std::{fmt, time::Duration};

use domain::OutboundMessage;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::request::build_request;

/// Default Graph API base URL
pub const DEFAULT_API_URL: &str = "https://graph.facebook.com";
/// Default Graph API version
pub const DEFAULT_API_VERSION: &str = "v18.0";

/// WhatsApp API errors
#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("Failed to parse API response: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// WhatsApp client configuration
#[derive(Clone)]
pub struct WhatsAppClientConfig {
    /// Graph API base URL (no trailing version)
    pub api_url: String,
    /// API version (default: v18.0)
    pub api_version: String,
    /// Meta Graph API access token
    pub access_token: String,
    /// Optional gateway key sent as `X-API-KEY`
    pub api_key: Option<String>,
    /// Phone number ID from WhatsApp Business
    pub phone_number_id: String,
    pub business_account_id: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WhatsAppClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: String::new(),
            api_key: None,
            phone_number_id: String::new(),
            business_account_id: None,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for WhatsAppClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppClientConfig")
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("phone_number_id", &self.phone_number_id)
            .field("business_account_id", &self.business_account_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// WhatsApp client for the Meta Graph API
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    client: Client,
    config: WhatsAppClientConfig,
    base_url: String,
}

/// API response for sent message
#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub messaging_product: String,
    #[serde(default)]
    pub contacts: Vec<ContactInfo>,
    #[serde(default)]
    pub messages: Vec<MessageInfo>,
}

impl SendMessageResponse {
    /// ID of the first accepted message
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }

    /// `wa_id` of the first resolved contact
    #[must_use]
    pub fn wa_id(&self) -> Option<&str> {
        self.contacts.first().map(|c| c.wa_id.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub input: String,
    pub wa_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageInfo {
    pub id: String,
}

/// API error response
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl WhatsAppClient {
    /// Create a new WhatsApp client
    pub fn new(config: WhatsAppClientConfig) -> Result<Self, WhatsAppError> {
        if config.access_token.is_empty() {
            return Err(WhatsAppError::Configuration(
                "access_token is required".to_string(),
            ));
        }
        if config.phone_number_id.is_empty() {
            return Err(WhatsAppError::Configuration(
                "phone_number_id is required".to_string(),
            ));
        }
        if config.api_url.is_empty() || config.api_version.is_empty() {
            return Err(WhatsAppError::Configuration(
                "api_url and api_version are required".to_string(),
            ));
        }

        let base_url = format!(
            "{}/{}/{}",
            config.api_url.trim_end_matches('/'),
            config.api_version,
            config.phone_number_id
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Base URL of the configured phone number (`{api_url}/{version}/{phone_number_id}`)
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a validated outbound message
    ///
    /// Issues exactly one `POST {base_url}/messages`.
    #[instrument(skip(self, message), fields(to = %message.recipient, kind = message.kind()))]
    pub async fn send(&self, message: &OutboundMessage) -> Result<SendMessageResponse, WhatsAppError> {
        let request = build_request(message);

        debug!("Sending WhatsApp message");

        let response = self
            .authorized(self.client.post(format!("{}/messages", self.base_url)))
            .json(&request)
            .send()
            .await?;

        let body = Self::handle_response(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Check if the WhatsApp API is reachable
    ///
    /// Performs a read-only business profile lookup; no message is sent.
    #[instrument(skip(self))]
    pub async fn is_available(&self) -> bool {
        self.authorized(
            self.client
                .get(format!("{}/whatsapp_business_profile", self.base_url)),
        )
        .query(&[("fields", "about,address,description,vertical")])
        .send()
        .await
        .is_ok_and(|res| res.status().is_success())
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.bearer_auth(&self.config.access_token);
        match &self.config.api_key {
            Some(key) if !key.is_empty() => builder.header("X-API-KEY", key),
            _ => builder,
        }
    }

    /// Map the vendor status onto an error, returning the body on success
    async fn handle_response(response: Response) -> Result<String, WhatsAppError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map_or_else(|_| body.clone(), |e| e.error.message);

        warn!(status = status.as_u16(), error = %message, "WhatsApp API returned an error");

        Err(match status {
            StatusCode::UNAUTHORIZED => WhatsAppError::Authentication(message),
            StatusCode::NOT_FOUND => WhatsAppError::NotFound(message),
            StatusCode::BAD_REQUEST => WhatsAppError::BadRequest(message),
            _ => WhatsAppError::Api {
                status: status.as_u16(),
                body,
            },
        })
    }
}
