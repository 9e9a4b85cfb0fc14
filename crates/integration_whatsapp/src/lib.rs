//! WhatsApp Business integration
//!
//! Cloud API client and request bodies for outbound messages, plus webhook
//! handling (subscription handshake, authentication, payload normalization)
//! for inbound ones.

pub mod client;
pub mod handler;
pub mod request;
pub mod webhook;

pub use client::{
    ContactInfo, DEFAULT_API_URL, DEFAULT_API_VERSION, MessageInfo, SendMessageResponse,
    WhatsAppClient, WhatsAppClientConfig, WhatsAppError,
};
pub use handler::{WebhookAction, WebhookHandler, WebhookRequest, WebhookResponse};
pub use request::{SendMessageRequest, build_request};
pub use webhook::{
    FlatEvent, META_OBJECT, MetaEnvelope, WebhookAuth, WebhookConfig, WebhookMessage,
    WebhookPayload, tokens_match, verify_signature,
};
