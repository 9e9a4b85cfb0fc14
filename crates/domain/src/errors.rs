//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid phone number format
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// A field of an outbound message failed validation
    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    /// A required field was not provided
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Operation is not valid for the given resource
    #[error("Operation '{operation}' is not valid for resource '{resource}'")]
    InvalidOperation { resource: String, operation: String },

    /// Unknown message type name
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),
}

impl DomainError {
    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending input field, when the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidPhoneNumber(_) => Some("phone_number"),
            Self::InvalidField { field, .. } => Some(field.as_str()),
            Self::MissingField(field) => Some(field.as_str()),
            Self::InvalidOperation { .. } => Some("operation"),
            Self::UnknownMessageType(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_phone_error_message() {
        let err = DomainError::InvalidPhoneNumber("12345".to_string());
        assert_eq!(err.to_string(), "Invalid phone number: 12345");
    }

    #[test]
    fn invalid_field_error_message() {
        let err = DomainError::invalid_field("latitude", "must be between -90 and 90");
        assert_eq!(err.to_string(), "Invalid latitude: must be between -90 and 90");
    }

    #[test]
    fn missing_field_error_message() {
        let err = DomainError::MissingField("text".to_string());
        assert_eq!(err.to_string(), "Missing required field: text");
    }

    #[test]
    fn invalid_operation_error_message() {
        let err = DomainError::InvalidOperation {
            resource: "message".to_string(),
            operation: "create".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Operation 'create' is not valid for resource 'message'"
        );
    }

    #[test]
    fn field_names_offending_input() {
        assert_eq!(
            DomainError::InvalidPhoneNumber("1".into()).field(),
            Some("phone_number")
        );
        assert_eq!(
            DomainError::MissingField("media_url".into()).field(),
            Some("media_url")
        );
        assert_eq!(DomainError::UnknownMessageType("x".into()).field(), None);
    }
}
