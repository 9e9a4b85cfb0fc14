//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Input of a batch item failed validation
    #[error("Validation failed for item {item}, field '{field}': {message}")]
    Validation {
        item: usize,
        field: String,
        message: String,
    },

    /// Vendor rejected the credentials (HTTP 401)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Vendor resource not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Vendor rejected the request body (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Any other vendor or transport failure
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Attach a batch item index to a domain error
    pub fn for_item(item: usize, err: DomainError) -> Self {
        let field = err.field().unwrap_or("item").to_string();
        Self::Validation {
            item,
            field,
            message: err.to_string(),
        }
    }

    /// Stable machine-readable category, used in error records
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Domain(_) | Self::Validation { .. } => "validation",
            Self::Authentication(_) => "authentication",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::ExternalService(_) => "api",
            Self::Configuration(_) => "configuration",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_field_and_item() {
        let err = ApplicationError::for_item(
            3,
            DomainError::InvalidPhoneNumber("'12345' must contain 10-15 digits".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("item 3"));
        assert!(msg.contains("phone_number"));
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn missing_field_maps_to_its_name() {
        let err = ApplicationError::for_item(0, DomainError::MissingField("text".into()));
        let ApplicationError::Validation { field, item, .. } = err else {
            unreachable!("Expected Validation");
        };
        assert_eq!(field, "text");
        assert_eq!(item, 0);
    }

    #[test]
    fn kinds_are_distinct() {
        assert_eq!(
            ApplicationError::Authentication("x".into()).kind(),
            "authentication"
        );
        assert_eq!(ApplicationError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(ApplicationError::BadRequest("x".into()).kind(), "bad_request");
        assert_eq!(ApplicationError::ExternalService("x".into()).kind(), "api");
    }
}
