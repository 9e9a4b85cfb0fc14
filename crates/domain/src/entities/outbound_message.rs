//! Outbound message model
//!
//! One `OutboundMessage` is built per send item and turned into exactly one
//! vendor request body by the integration layer.

use serde::{Deserialize, Serialize};

use crate::{DomainError, PhoneNumber};

/// Cloud API limit for reply buttons per message
pub const MAX_REPLY_BUTTONS: usize = 3;
/// Cloud API limit for a reply button title
pub const MAX_BUTTON_TITLE_LEN: usize = 20;
/// Cloud API limit for a text body
pub const MAX_TEXT_LEN: usize = 4096;

/// A quick-reply button of an interactive message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyButton {
    pub id: String,
    pub title: String,
}

/// Type-specific payload of an outbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        body: String,
        #[serde(default)]
        preview_url: bool,
    },
    Image {
        link: String,
        caption: Option<String>,
    },
    Document {
        link: String,
        caption: Option<String>,
        filename: Option<String>,
    },
    Audio {
        link: String,
    },
    Location {
        latitude: f64,
        longitude: f64,
        name: Option<String>,
        address: Option<String>,
    },
    Buttons {
        body: String,
        buttons: Vec<ReplyButton>,
        header: Option<String>,
        footer: Option<String>,
    },
    Template {
        name: String,
        language: String,
        parameters: Vec<String>,
    },
}

impl MessageContent {
    /// Short name used in logs and results
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Document { .. } => "document",
            Self::Audio { .. } => "audio",
            Self::Location { .. } => "location",
            Self::Buttons { .. } => "button",
            Self::Template { .. } => "template",
        }
    }

    /// Check vendor limits and required values
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::Text { body, .. } => {
                require_non_empty("text", body)?;
                if body.chars().count() > MAX_TEXT_LEN {
                    return Err(DomainError::invalid_field(
                        "text",
                        format!("must be at most {MAX_TEXT_LEN} characters"),
                    ));
                }
            },
            Self::Image { link, .. } | Self::Document { link, .. } | Self::Audio { link } => {
                require_url("media_url", link)?;
            },
            Self::Location {
                latitude,
                longitude,
                ..
            } => {
                if !(-90.0..=90.0).contains(latitude) {
                    return Err(DomainError::invalid_field(
                        "latitude",
                        "must be between -90 and 90",
                    ));
                }
                if !(-180.0..=180.0).contains(longitude) {
                    return Err(DomainError::invalid_field(
                        "longitude",
                        "must be between -180 and 180",
                    ));
                }
            },
            Self::Buttons { body, buttons, .. } => {
                require_non_empty("text", body)?;
                validate_buttons(buttons)?;
            },
            Self::Template { name, language, .. } => {
                require_non_empty("template_name", name)?;
                require_non_empty("language_code", language)?;
            },
        }
        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField(field.to_string()));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> Result<(), DomainError> {
    require_non_empty(field, value)?;
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        return Err(DomainError::invalid_field(
            field,
            "must be an http(s) URL",
        ));
    }
    Ok(())
}

fn validate_buttons(buttons: &[ReplyButton]) -> Result<(), DomainError> {
    if buttons.is_empty() || buttons.len() > MAX_REPLY_BUTTONS {
        return Err(DomainError::invalid_field(
            "buttons",
            format!("must contain 1-{MAX_REPLY_BUTTONS} buttons"),
        ));
    }
    for (i, button) in buttons.iter().enumerate() {
        if button.id.trim().is_empty() {
            return Err(DomainError::invalid_field(
                format!("buttons[{i}].id"),
                "must not be empty",
            ));
        }
        let title_len = button.title.chars().count();
        if title_len == 0 || title_len > MAX_BUTTON_TITLE_LEN {
            return Err(DomainError::invalid_field(
                format!("buttons[{i}].title"),
                format!("must be 1-{MAX_BUTTON_TITLE_LEN} characters"),
            ));
        }
        if buttons[..i].iter().any(|b| b.id == button.id) {
            return Err(DomainError::invalid_field(
                format!("buttons[{i}].id"),
                format!("duplicate button id '{}'", button.id),
            ));
        }
    }
    Ok(())
}

/// A message addressed to one recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub recipient: PhoneNumber,
    pub content: MessageContent,
}

impl OutboundMessage {
    /// Create a validated outbound message
    pub fn new(recipient: PhoneNumber, content: MessageContent) -> Result<Self, DomainError> {
        content.validate()?;
        Ok(Self { recipient, content })
    }

    /// Shortcut for a plain text message
    pub fn text(recipient: PhoneNumber, body: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(
            recipient,
            MessageContent::Text {
                body: body.into(),
                preview_url: false,
            },
        )
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.content.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> PhoneNumber {
        PhoneNumber::new("15551234567").unwrap()
    }

    fn button(id: &str, title: &str) -> ReplyButton {
        ReplyButton {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn text_message_is_valid() {
        let msg = OutboundMessage::text(phone(), "hello").unwrap();
        assert_eq!(msg.kind(), "text");
        assert_eq!(msg.recipient.as_str(), "15551234567");
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = OutboundMessage::text(phone(), "   ").unwrap_err();
        assert_eq!(err.field(), Some("text"));
    }

    #[test]
    fn overlong_text_is_rejected() {
        let body = "a".repeat(MAX_TEXT_LEN + 1);
        assert!(OutboundMessage::text(phone(), body).is_err());
    }

    #[test]
    fn media_requires_http_url() {
        let content = MessageContent::Image {
            link: "ftp://example.com/a.png".to_string(),
            caption: None,
        };
        let err = content.validate().unwrap_err();
        assert_eq!(err.field(), Some("media_url"));

        let content = MessageContent::Audio {
            link: "https://example.com/a.ogg".to_string(),
        };
        assert!(content.validate().is_ok());
    }

    #[test]
    fn location_bounds_checked() {
        let content = MessageContent::Location {
            latitude: 91.0,
            longitude: 0.0,
            name: None,
            address: None,
        };
        assert_eq!(content.validate().unwrap_err().field(), Some("latitude"));

        let content = MessageContent::Location {
            latitude: 52.52,
            longitude: -181.0,
            name: None,
            address: None,
        };
        assert_eq!(content.validate().unwrap_err().field(), Some("longitude"));
    }

    #[test]
    fn buttons_limits() {
        let none = MessageContent::Buttons {
            body: "Pick one".to_string(),
            buttons: vec![],
            header: None,
            footer: None,
        };
        assert!(none.validate().is_err());

        let four = MessageContent::Buttons {
            body: "Pick one".to_string(),
            buttons: vec![
                button("a", "A"),
                button("b", "B"),
                button("c", "C"),
                button("d", "D"),
            ],
            header: None,
            footer: None,
        };
        assert!(four.validate().is_err());

        let long_title = MessageContent::Buttons {
            body: "Pick one".to_string(),
            buttons: vec![button("a", "This title is far too long")],
            header: None,
            footer: None,
        };
        assert_eq!(
            long_title.validate().unwrap_err().field(),
            Some("buttons[0].title")
        );
    }

    #[test]
    fn duplicate_button_ids_rejected() {
        let content = MessageContent::Buttons {
            body: "Pick one".to_string(),
            buttons: vec![button("yes", "Yes"), button("yes", "Also yes")],
            header: None,
            footer: None,
        };
        assert_eq!(content.validate().unwrap_err().field(), Some("buttons[1].id"));
    }

    #[test]
    fn template_requires_name_and_language() {
        let content = MessageContent::Template {
            name: String::new(),
            language: "en_US".to_string(),
            parameters: vec![],
        };
        assert_eq!(content.validate().unwrap_err().field(), Some("template_name"));
    }
}
