//! WhatsApp configuration: Cloud API credentials and webhook settings.

use std::fmt;

use domain::MessageType;
use integration_whatsapp::{
    DEFAULT_API_URL, DEFAULT_API_VERSION, WebhookAuth, WebhookConfig, WhatsAppClientConfig,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// How webhook POST deliveries are authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookAuthMode {
    #[default]
    None,
    /// Shared token in the `x-webhook-token` header
    Token,
    /// Meta `x-hub-signature-256` HMAC
    Meta,
}

impl fmt::Display for WebhookAuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Token => write!(f, "token"),
            Self::Meta => write!(f, "meta"),
        }
    }
}

/// WhatsApp integration configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Graph API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API version (default: v18.0)
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Meta Graph API access token (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub access_token: Option<SecretString>,

    /// Optional gateway key sent as `X-API-KEY` (sensitive)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Phone number ID from WhatsApp Business
    #[serde(default)]
    pub phone_number_id: Option<String>,

    #[serde(default)]
    pub business_account_id: Option<String>,

    /// Verify token for the webhook handshake (sensitive)
    #[serde(default, skip_serializing)]
    pub verify_token: Option<SecretString>,

    /// POST authentication mode
    #[serde(default)]
    pub webhook_auth: WebhookAuthMode,

    /// Shared token for `token` auth mode (sensitive)
    #[serde(default, skip_serializing)]
    pub webhook_token: Option<SecretString>,

    /// App secret for `meta` auth mode (sensitive)
    #[serde(default, skip_serializing)]
    pub app_secret: Option<SecretString>,

    /// Message types to emit (empty = all)
    #[serde(default)]
    pub allowed_types: Vec<MessageType>,

    /// Request timeout for Cloud API calls in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn redacted(secret: Option<&SecretString>) -> Option<&'static str> {
    secret.map(|_| "[REDACTED]")
}

impl fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("access_token", &redacted(self.access_token.as_ref()))
            .field("api_key", &redacted(self.api_key.as_ref()))
            .field("phone_number_id", &self.phone_number_id)
            .field("business_account_id", &self.business_account_id)
            .field("verify_token", &redacted(self.verify_token.as_ref()))
            .field("webhook_auth", &self.webhook_auth)
            .field("webhook_token", &redacted(self.webhook_token.as_ref()))
            .field("app_secret", &redacted(self.app_secret.as_ref()))
            .field("allowed_types", &self.allowed_types)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

const fn default_timeout() -> u64 {
    30
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_version: default_api_version(),
            access_token: None,
            api_key: None,
            phone_number_id: None,
            business_account_id: None,
            verify_token: None,
            webhook_auth: WebhookAuthMode::None,
            webhook_token: None,
            app_secret: None,
            allowed_types: Vec::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn expose(secret: Option<&SecretString>) -> String {
    secret
        .map(|s| s.expose_secret().to_string())
        .unwrap_or_default()
}

impl WhatsAppConfig {
    /// Get the access token as a string reference (for API calls)
    #[must_use]
    pub fn access_token_str(&self) -> Option<&str> {
        self.access_token.as_ref().map(ExposeSecret::expose_secret)
    }

    /// Whether credentials for outbound sends are present
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.access_token_str().is_some_and(|t| !t.is_empty())
            && self
                .phone_number_id
                .as_deref()
                .is_some_and(|id| !id.is_empty())
    }

    /// Client configuration for the Cloud API
    ///
    /// Missing credentials become empty strings; `WhatsAppClient::new` rejects them.
    #[must_use]
    pub fn client_config(&self) -> WhatsAppClientConfig {
        WhatsAppClientConfig {
            api_url: self.api_url.clone(),
            api_version: self.api_version.clone(),
            access_token: expose(self.access_token.as_ref()),
            api_key: self
                .api_key
                .as_ref()
                .map(|k| k.expose_secret().to_string()),
            phone_number_id: self.phone_number_id.clone().unwrap_or_default(),
            business_account_id: self.business_account_id.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Webhook handler configuration
    #[must_use]
    pub fn webhook_config(&self) -> WebhookConfig {
        let auth = match self.webhook_auth {
            WebhookAuthMode::None => WebhookAuth::None,
            WebhookAuthMode::Token => WebhookAuth::Token(expose(self.webhook_token.as_ref())),
            WebhookAuthMode::Meta => WebhookAuth::Meta {
                app_secret: expose(self.app_secret.as_ref()),
            },
        };
        WebhookConfig {
            verify_token: expose(self.verify_token.as_ref()),
            auth,
            allowed_types: self.allowed_types.clone(),
        }
    }
}
