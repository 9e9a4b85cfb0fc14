//! Infrastructure layer - Adapters for external systems
//!
//! Implements the ports defined in the application layer and owns
//! configuration loading and tracing setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{
    AppConfig, ForwardConfig, ServerConfig, WebhookAuthMode, WhatsAppConfig,
};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
