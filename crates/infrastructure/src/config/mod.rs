//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `whatsapp`: Cloud API credentials and webhook settings
//! - `forward`: delivery of normalized records to the workflow engine
//!
//! Sources in order of precedence (last wins): defaults, optional
//! `config.toml`, `WABRIDGE_*` environment variables with `__` nesting
//! (e.g. `WABRIDGE_WHATSAPP__ACCESS_TOKEN`).

mod forward;
mod server;
mod whatsapp;

use serde::{Deserialize, Serialize};

pub use forward::ForwardConfig;
pub use server::ServerConfig;
pub use whatsapp::{WebhookAuthMode, WhatsAppConfig};

use crate::telemetry::TelemetryConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "WABRIDGE";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// WhatsApp configuration
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Record forwarding configuration
    #[serde(default)]
    pub forward: ForwardConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit environment map instead of the process environment
    fn load_from(
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., WABRIDGE_SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("whatsapp.allowed_types")
                    .with_list_parse_key("server.allowed_origins")
                    .source(env),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Report settings that will make parts of the service unusable
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let whatsapp = &self.whatsapp;

        if !whatsapp.has_credentials() {
            warnings.push(
                "whatsapp.access_token or whatsapp.phone_number_id not set: outbound sends are disabled"
                    .to_string(),
            );
        }
        if whatsapp.verify_token.is_none() {
            warnings.push(
                "whatsapp.verify_token not set: webhook verification will be rejected".to_string(),
            );
        }
        match whatsapp.webhook_auth {
            WebhookAuthMode::Token if whatsapp.webhook_token.is_none() => warnings.push(
                "whatsapp.webhook_auth is 'token' but webhook_token is not set: deliveries will be rejected"
                    .to_string(),
            ),
            WebhookAuthMode::Meta if whatsapp.app_secret.is_none() => warnings.push(
                "whatsapp.webhook_auth is 'meta' but app_secret is not set: deliveries will be rejected"
                    .to_string(),
            ),
            _ => {},
        }
        if let Some(url) = &self.forward.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                warnings.push(format!("forward.url '{url}' is not an http(s) URL"));
            }
        }

        warnings
    }
}
