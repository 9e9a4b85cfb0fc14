//! WhatsApp webhook payloads
//!
//! Classifies inbound webhook bodies, extracts the first message into a
//! [`NormalizedMessage`] and verifies request authenticity.

use std::fmt;

use chrono::{DateTime, Utc};
use domain::{
    InteractiveReply, LocationInfo, MediaInfo, MessageType, NormalizedMessage, PayloadSource,
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// `object` value identifying a Meta Cloud API envelope
pub const META_OBJECT: &str = "whatsapp_business_account";

/// How POST deliveries are authenticated
#[derive(Clone, Default, PartialEq, Eq)]
pub enum WebhookAuth {
    /// Accept every delivery
    #[default]
    None,
    /// `x-webhook-token` header must equal the shared token
    Token(String),
    /// `x-hub-signature-256` must be an HMAC-SHA256 of the body under the app secret
    Meta { app_secret: String },
}

impl WebhookAuth {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Token(_) => "token",
            Self::Meta { .. } => "meta",
        }
    }
}

impl fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Token(_) => f.debug_tuple("Token").field(&"[REDACTED]").finish(),
            Self::Meta { .. } => f
                .debug_struct("Meta")
                .field("app_secret", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Webhook configuration
#[derive(Clone, Default)]
pub struct WebhookConfig {
    /// Verify token for the subscription handshake
    pub verify_token: String,
    /// POST authentication mode
    pub auth: WebhookAuth,
    /// Message types to emit; empty means all
    pub allowed_types: Vec<MessageType>,
}

impl WebhookConfig {
    /// Whether a record of this type passes the allowlist
    #[must_use]
    pub fn allows(&self, message_type: MessageType) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.contains(&message_type)
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("verify_token", &"[REDACTED]")
            .field("auth", &self.auth)
            .field("allowed_types", &self.allowed_types)
            .finish()
    }
}

/// Meta Cloud API envelope
#[derive(Debug, Deserialize)]
pub struct MetaEnvelope {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<MetaEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MetaEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<MetaChange>,
}

#[derive(Debug, Deserialize)]
pub struct MetaChange {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: MetaValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetaValue {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub metadata: Option<MetaMetadata>,
    #[serde(default)]
    pub contacts: Vec<MetaContact>,
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
    #[serde(default)]
    pub statuses: Vec<WebhookStatus>,
}

#[derive(Debug, Deserialize)]
pub struct MetaMetadata {
    pub display_phone_number: Option<String>,
    pub phone_number_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetaContact {
    pub wa_id: Option<String>,
    pub profile: Option<ContactProfile>,
}

#[derive(Debug, Deserialize)]
pub struct ContactProfile {
    pub name: Option<String>,
}

/// Delivery status callback (sent, delivered, read, failed)
#[derive(Debug, Deserialize)]
pub struct WebhookStatus {
    pub id: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    pub recipient_id: Option<String>,
}

impl MetaEnvelope {
    /// `entry[0].changes[0].value`
    #[must_use]
    pub fn first_value(&self) -> Option<&MetaValue> {
        self.entry
            .first()
            .and_then(|entry| entry.changes.first())
            .map(|change| &change.value)
    }
}

/// Flat event shape used by gateways and test tools
#[derive(Debug, Deserialize)]
pub struct FlatEvent {
    pub event: Value,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
}

/// One inbound message, shared by both payload shapes
#[derive(Debug, Default, Deserialize)]
pub struct WebhookMessage {
    pub id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<TextField>,
    /// Flat-shape text fallback
    pub body: Option<String>,
    pub image: Option<WebhookMedia>,
    pub video: Option<WebhookMedia>,
    pub audio: Option<WebhookMedia>,
    pub voice: Option<WebhookMedia>,
    pub document: Option<WebhookMedia>,
    pub location: Option<WebhookLocation>,
    pub interactive: Option<WebhookInteractive>,
    pub button: Option<TemplateButton>,
}

/// `text` is an object in Meta payloads and sometimes a plain string in flat ones
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Object { body: String },
    Plain(String),
}

impl TextField {
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Object { body } | Self::Plain(body) => body,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMedia {
    pub id: Option<String>,
    pub mime_type: Option<String>,
    pub sha256: Option<String>,
    pub caption: Option<String>,
    pub filename: Option<String>,
    #[serde(alias = "link")]
    pub url: Option<String>,
    #[serde(default)]
    pub voice: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookInteractive {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub button_reply: Option<ReplyRef>,
    pub list_reply: Option<ReplyRef>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRef {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

/// Quick-reply button of a template message
#[derive(Debug, Deserialize)]
pub struct TemplateButton {
    pub payload: Option<String>,
    pub text: Option<String>,
}

/// Accept strings and numbers (Unix timestamps arrive either way)
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl WebhookMessage {
    /// Message type from the `type` field, inferred from the payload when absent
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        if let Some(kind) = &self.kind {
            return MessageType::from_wire(kind);
        }
        if self.text.is_some() || self.body.is_some() {
            MessageType::Text
        } else if self.image.is_some() {
            MessageType::Image
        } else if self.video.is_some() {
            MessageType::Video
        } else if self.audio.is_some() || self.voice.is_some() {
            MessageType::Audio
        } else if self.document.is_some() {
            MessageType::Document
        } else if self.location.is_some() {
            MessageType::Location
        } else if self.interactive.is_some() {
            MessageType::Interactive
        } else if self.button.is_some() {
            MessageType::Button
        } else {
            MessageType::Unknown
        }
    }

    fn media(&self) -> Option<&WebhookMedia> {
        self.image
            .as_ref()
            .or(self.video.as_ref())
            .or(self.audio.as_ref())
            .or(self.voice.as_ref())
            .or(self.document.as_ref())
    }

    fn interactive_reply(&self) -> Option<InteractiveReply> {
        if let Some(interactive) = &self.interactive {
            let (kind, reply) = match (&interactive.button_reply, &interactive.list_reply) {
                (Some(reply), _) => ("button_reply", reply),
                (None, Some(reply)) => ("list_reply", reply),
                (None, None) => return None,
            };
            return Some(InteractiveReply {
                kind: interactive.kind.clone().unwrap_or_else(|| kind.to_string()),
                id: reply.id.clone(),
                title: reply.title.clone(),
                description: reply.description.clone(),
            });
        }
        self.button.as_ref().map(|button| InteractiveReply {
            kind: "button".to_string(),
            id: button.payload.clone().unwrap_or_default(),
            title: button.text.clone().unwrap_or_default(),
            description: None,
        })
    }

    /// Flatten this message into a record
    #[must_use]
    pub fn normalize(
        &self,
        source: PayloadSource,
        raw: &Value,
        received_at: DateTime<Utc>,
    ) -> NormalizedMessage {
        let mut record =
            NormalizedMessage::new(source, self.message_type(), raw.clone(), received_at);
        record.message_id.clone_from(&self.id);
        record.from.clone_from(&self.from);
        record.to.clone_from(&self.to);
        record.timestamp.clone_from(&self.timestamp);

        let media = self.media();
        let interactive = self.interactive_reply();

        record.body = self
            .text
            .as_ref()
            .map(|text| text.body().to_string())
            .or_else(|| self.body.clone())
            .or_else(|| media.and_then(|m| m.caption.clone()))
            .or_else(|| interactive.as_ref().map(|reply| reply.title.clone()));

        record.media = media.map(|m| MediaInfo {
            id: m.id.clone(),
            mime_type: m.mime_type.clone(),
            sha256: m.sha256.clone(),
            filename: m.filename.clone(),
            url: m.url.clone(),
            voice: m.voice || self.voice.is_some(),
        });
        record.location = self.location.as_ref().map(|l| LocationInfo {
            latitude: l.latitude,
            longitude: l.longitude,
            name: l.name.clone(),
            address: l.address.clone(),
        });
        record.interactive = interactive;
        record
    }
}

/// Closed set of recognized webhook body shapes
#[derive(Debug)]
pub enum WebhookPayload {
    /// `object == "whatsapp_business_account"`
    MetaEnvelope(MetaEnvelope),
    /// Top-level `event` field
    FlatEvent(FlatEvent),
    /// Anything else; passed through unmodified
    Unknown,
}

impl WebhookPayload {
    /// Classify a JSON object body
    pub fn classify(body: &Value) -> Result<Self, serde_json::Error> {
        if body.get("object").and_then(Value::as_str) == Some(META_OBJECT) {
            return MetaEnvelope::deserialize(body).map(Self::MetaEnvelope);
        }
        if body.get("event").is_some() {
            return FlatEvent::deserialize(body).map(Self::FlatEvent);
        }
        Ok(Self::Unknown)
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MetaEnvelope(_) => "meta",
            Self::FlatEvent(_) => "flat",
            Self::Unknown => "unknown",
        }
    }

    /// Produce the record for this delivery
    ///
    /// Returns `None` when the payload carries no message, such as a status callback.
    #[must_use]
    pub fn normalize(&self, raw: &Value, received_at: DateTime<Utc>) -> Option<NormalizedMessage> {
        match self {
            Self::MetaEnvelope(envelope) => {
                let value = envelope.first_value()?;
                let message = value.messages.first()?;
                let mut record = message.normalize(PayloadSource::Meta, raw, received_at);
                if record.to.is_none() {
                    record.to = value.metadata.as_ref().and_then(|m| {
                        m.display_phone_number
                            .clone()
                            .or_else(|| m.phone_number_id.clone())
                    });
                }
                record.sender_name = value
                    .contacts
                    .iter()
                    .find(|c| c.wa_id.is_some() && c.wa_id == message.from)
                    .or_else(|| value.contacts.first())
                    .and_then(|c| c.profile.as_ref())
                    .and_then(|p| p.name.clone());
                Some(record)
            },
            Self::FlatEvent(event) => {
                let message = event.messages.first()?;
                let mut record = message.normalize(PayloadSource::Flat, raw, received_at);
                if record.to.is_none() {
                    record.to.clone_from(&event.to);
                }
                Some(record)
            },
            Self::Unknown => Some(NormalizedMessage::passthrough(raw.clone(), received_at)),
        }
    }
}

/// Verify webhook signature
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    // Signature format: sha256=<hex>
    let Some(signature_hex) = signature.trim().strip_prefix("sha256=") else {
        warn!("Invalid signature format");
        return false;
    };

    if secret.is_empty() {
        warn!("No app secret configured for signature verification");
        return false;
    }

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        warn!("Failed to create HMAC");
        return false;
    };

    mac.update(payload);

    let Ok(expected) = hex::decode(signature_hex) else {
        warn!("Failed to decode signature hex");
        return false;
    };

    mac.verify_slice(&expected).is_ok()
}

/// Compare a provided token with the configured one in constant time
///
/// An empty configured token never matches.
#[must_use]
pub fn tokens_match(configured: &str, provided: &str) -> bool {
    !configured.is_empty() && bool::from(configured.as_bytes().ct_eq(provided.as_bytes()))
}
