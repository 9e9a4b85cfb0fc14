//! Normalized inbound message
//!
//! The flattened, vendor-agnostic record produced from one webhook delivery.
//! It is handed to the workflow engine and never persisted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MessageType;

/// Which payload shape a record was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadSource {
    /// Meta Cloud API envelope (`object: whatsapp_business_account`)
    Meta,
    /// Flat event shape with a top-level `event` field
    Flat,
    /// Unrecognized body passed through as-is
    Raw,
}

/// Media attached to an image/video/audio/document message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Vendor media ID (download handle)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Direct URL, when the vendor provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Voice note flag for audio messages
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub voice: bool,
}

/// Shared location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Reply to an interactive button or list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveReply {
    /// `button_reply`, `list_reply` or `button`
    pub kind: String,
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A normalized inbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    /// Vendor message ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Sender phone number / wa_id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Receiving business number, when the payload carries it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Sender display name from the contacts block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Text body, media caption, or interactive reply title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<InteractiveReply>,
    /// Vendor timestamp (Unix seconds as sent by the vendor)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// When this service received the webhook
    pub received_at: DateTime<Utc>,
    pub source: PayloadSource,
    /// Original request body
    pub raw: serde_json::Value,
}

impl NormalizedMessage {
    /// Create an empty record of the given type
    #[must_use]
    pub fn new(
        source: PayloadSource,
        message_type: MessageType,
        raw: serde_json::Value,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            message_id: None,
            from: None,
            to: None,
            sender_name: None,
            message_type,
            body: None,
            media: None,
            location: None,
            interactive: None,
            timestamp: None,
            received_at,
            source,
            raw,
        }
    }

    /// Wrap an unrecognized body without interpreting it
    #[must_use]
    pub fn passthrough(raw: serde_json::Value, received_at: DateTime<Utc>) -> Self {
        Self::new(PayloadSource::Raw, MessageType::Unknown, raw, received_at)
    }

    /// Whether this record was produced by field extraction (as opposed to passthrough)
    #[must_use]
    pub const fn is_extracted(&self) -> bool {
        !matches!(self.source, PayloadSource::Raw)
    }
}
