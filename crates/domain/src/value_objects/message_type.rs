//! Message type - the kind of content a WhatsApp message carries

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Message content kinds as reported by the Cloud API `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    Document,
    Location,
    /// Reply to an interactive button or list message
    Interactive,
    /// Quick-reply button of a template message
    Button,
    /// Anything else (stickers, reactions, system messages, ...)
    #[serde(other)]
    Unknown,
}

impl MessageType {
    /// Wire name of this type
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Location => "location",
            Self::Interactive => "interactive",
            Self::Button => "button",
            Self::Unknown => "unknown",
        }
    }

    /// Map a vendor `type` string, falling back to `Unknown`
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" | "voice" => Ok(Self::Audio),
            "document" => Ok(Self::Document),
            "location" => Ok(Self::Location),
            "interactive" => Ok(Self::Interactive),
            "button" => Ok(Self::Button),
            _ => Err(DomainError::UnknownMessageType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types() {
        assert_eq!("text".parse::<MessageType>().unwrap(), MessageType::Text);
        assert_eq!("IMAGE".parse::<MessageType>().unwrap(), MessageType::Image);
        assert_eq!(
            "interactive".parse::<MessageType>().unwrap(),
            MessageType::Interactive
        );
    }

    #[test]
    fn voice_is_audio() {
        assert_eq!("voice".parse::<MessageType>().unwrap(), MessageType::Audio);
    }

    #[test]
    fn unknown_type_is_error_for_parse() {
        assert!("sticker".parse::<MessageType>().is_err());
    }

    #[test]
    fn from_wire_falls_back_to_unknown() {
        assert_eq!(MessageType::from_wire("sticker"), MessageType::Unknown);
        assert_eq!(MessageType::from_wire("document"), MessageType::Document);
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&MessageType::Location).unwrap();
        assert_eq!(json, "\"location\"");

        let parsed: MessageType = serde_json::from_str("\"reaction\"").unwrap();
        assert_eq!(parsed, MessageType::Unknown);
    }
}
