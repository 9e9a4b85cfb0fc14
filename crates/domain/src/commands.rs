//! Resource/operation pairs a send item can ask for

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// What a send item operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    #[default]
    Message,
    Contact,
    Group,
}

impl Resource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Contact => "contact",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The action requested for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    // Message operations
    SendText,
    SendImage,
    SendDocument,
    SendAudio,
    SendLocation,
    #[serde(alias = "send_buttons")]
    SendButton,
    SendTemplate,

    // Contact / group operations
    Get,
    List,
    Create,
    Update,
    Delete,
    AddParticipants,
    RemoveParticipants,
}

impl Operation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SendText => "send_text",
            Self::SendImage => "send_image",
            Self::SendDocument => "send_document",
            Self::SendAudio => "send_audio",
            Self::SendLocation => "send_location",
            Self::SendButton => "send_button",
            Self::SendTemplate => "send_template",
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::AddParticipants => "add_participants",
            Self::RemoveParticipants => "remove_participants",
        }
    }

    /// Whether this is a message send operation
    #[must_use]
    pub const fn is_send(&self) -> bool {
        matches!(
            self,
            Self::SendText
                | Self::SendImage
                | Self::SendDocument
                | Self::SendAudio
                | Self::SendLocation
                | Self::SendButton
                | Self::SendTemplate
        )
    }

    /// Check that this operation belongs to `resource`
    pub fn check_resource(self, resource: Resource) -> Result<(), DomainError> {
        let is_send = self.is_send();
        let valid = match resource {
            Resource::Message => is_send,
            Resource::Contact => matches!(
                self,
                Self::Get | Self::List | Self::Create | Self::Update | Self::Delete
            ),
            Resource::Group => !is_send,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidOperation {
                resource: resource.to_string(),
                operation: self.to_string(),
            })
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
