//! Dispatch service - batch send use case
//!
//! Turns loosely-typed send parameters into validated outbound messages and
//! pushes them through the messenger port one item at a time. Items are never
//! sent concurrently, so provider rate limits are respected at the cost of
//! latency, and every result keeps the index of the item it belongs to.

use std::{fmt, sync::Arc};

use domain::{
    DomainError, MessageContent, Operation, OutboundMessage, PhoneNumber, ReplyButton, Resource,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::{error::ApplicationError, ports::MessengerPort};

/// A reply button as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonParam {
    pub id: String,
    pub title: String,
}

/// Parameters of one batch item
///
/// Every per-operation field is optional at this level; the operation
/// decides which ones are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendParams {
    #[serde(default)]
    pub resource: Resource,
    pub operation: Operation,
    #[serde(default, alias = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(default, alias = "messageText")]
    pub text: Option<String>,
    #[serde(default)]
    pub preview_url: Option<bool>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub buttons: Vec<ButtonParam>,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub template_parameters: Vec<String>,
}

impl SendParams {
    /// Parameters for a `message` / `send_text` item
    pub fn text(phone_number: impl Into<String>, text: impl Into<String>) -> Self {
        let mut params = Self::empty(Resource::Message, Operation::SendText);
        params.phone_number = Some(phone_number.into());
        params.text = Some(text.into());
        params
    }

    /// Parameters with only resource and operation set
    #[must_use]
    pub const fn empty(resource: Resource, operation: Operation) -> Self {
        Self {
            resource,
            operation,
            phone_number: None,
            text: None,
            preview_url: None,
            media_url: None,
            caption: None,
            filename: None,
            latitude: None,
            longitude: None,
            location_name: None,
            address: None,
            buttons: Vec::new(),
            header: None,
            footer: None,
            template_name: None,
            language_code: None,
            template_parameters: Vec::new(),
        }
    }
}

/// A batch of send items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendBatch {
    /// Capture per-item failures as error records instead of aborting
    #[serde(default, alias = "continueOnFail")]
    pub continue_on_fail: bool,
    pub items: Vec<SendParams>,
}

/// Outcome of one batch item, paired with its index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResult {
    pub item: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl ItemResult {
    fn succeeded(item: usize, data: serde_json::Value) -> Self {
        Self {
            item,
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    fn failed(item: usize, err: &ApplicationError) -> Self {
        Self {
            item,
            success: false,
            data: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }
    }
}

fn required<'a>(value: Option<&'a String>, field: &str) -> Result<&'a str, DomainError> {
    value
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| DomainError::MissingField(field.to_string()))
}

fn content_for(params: &SendParams) -> Result<MessageContent, DomainError> {
    let content = match params.operation {
        Operation::SendText => MessageContent::Text {
            body: required(params.text.as_ref(), "text")?.to_string(),
            preview_url: params.preview_url.unwrap_or(false),
        },
        Operation::SendImage => MessageContent::Image {
            link: required(params.media_url.as_ref(), "media_url")?.to_string(),
            caption: params.caption.clone(),
        },
        Operation::SendDocument => MessageContent::Document {
            link: required(params.media_url.as_ref(), "media_url")?.to_string(),
            caption: params.caption.clone(),
            filename: params.filename.clone(),
        },
        Operation::SendAudio => MessageContent::Audio {
            link: required(params.media_url.as_ref(), "media_url")?.to_string(),
        },
        Operation::SendLocation => MessageContent::Location {
            latitude: params
                .latitude
                .ok_or_else(|| DomainError::MissingField("latitude".to_string()))?,
            longitude: params
                .longitude
                .ok_or_else(|| DomainError::MissingField("longitude".to_string()))?,
            name: params.location_name.clone(),
            address: params.address.clone(),
        },
        Operation::SendButton => MessageContent::Buttons {
            body: required(params.text.as_ref(), "text")?.to_string(),
            buttons: params
                .buttons
                .iter()
                .map(|b| ReplyButton {
                    id: b.id.clone(),
                    title: b.title.clone(),
                })
                .collect(),
            header: params.header.clone(),
            footer: params.footer.clone(),
        },
        Operation::SendTemplate => MessageContent::Template {
            name: required(params.template_name.as_ref(), "template_name")?.to_string(),
            language: params
                .language_code
                .clone()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "en_US".to_string()),
            parameters: params.template_parameters.clone(),
        },
        other => {
            return Err(DomainError::InvalidOperation {
                resource: params.resource.to_string(),
                operation: other.to_string(),
            });
        },
    };
    Ok(content)
}

/// Build and validate the outbound message for batch item `item`
///
/// The phone number is checked first so that an invalid recipient is
/// reported before any other field.
pub fn build_outbound_message(
    item: usize,
    params: &SendParams,
) -> Result<OutboundMessage, ApplicationError> {
    let build = || -> Result<OutboundMessage, DomainError> {
        let raw_phone = required(params.phone_number.as_ref(), "phone_number")?;
        let recipient = PhoneNumber::new(raw_phone)?;
        let content = content_for(params)?;
        OutboundMessage::new(recipient, content)
    };
    build().map_err(|e| ApplicationError::for_item(item, e))
}

/// Batch send use case
pub struct DispatchService {
    messenger: Arc<dyn MessengerPort>,
}

impl fmt::Debug for DispatchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchService")
            .field("provider", &self.messenger.provider_name())
            .finish()
    }
}

impl DispatchService {
    /// Create a new dispatch service
    pub fn new(messenger: Arc<dyn MessengerPort>) -> Self {
        Self { messenger }
    }

    /// Process a batch sequentially
    ///
    /// Without `continue_on_fail` the first failing item aborts the batch and
    /// its error is returned; items after it are not sent.
    #[instrument(skip(self, batch), fields(items = batch.items.len(), continue_on_fail = batch.continue_on_fail))]
    pub async fn send(&self, batch: SendBatch) -> Result<Vec<ItemResult>, ApplicationError> {
        let mut results = Vec::with_capacity(batch.items.len());

        for (item, params) in batch.items.iter().enumerate() {
            match self.send_item(item, params).await {
                Ok(data) => results.push(ItemResult::succeeded(item, data)),
                Err(e) if batch.continue_on_fail => {
                    warn!(item, error = %e, "Batch item failed, continuing");
                    results.push(ItemResult::failed(item, &e));
                },
                Err(e) => {
                    error!(item, error = %e, "Batch item failed, aborting batch");
                    return Err(e);
                },
            }
        }

        info!(
            processed = results.len(),
            failed = results.iter().filter(|r| !r.success).count(),
            "Batch processed"
        );
        Ok(results)
    }

    /// Process one item and return its output record
    pub async fn send_item(
        &self,
        item: usize,
        params: &SendParams,
    ) -> Result<serde_json::Value, ApplicationError> {
        params
            .operation
            .check_resource(params.resource)
            .map_err(|e| ApplicationError::for_item(item, e))?;

        match params.resource {
            Resource::Message => {
                let message = build_outbound_message(item, params)?;
                debug!(item, kind = message.kind(), to = %message.recipient, "Sending message");

                let sent = self.messenger.send(&message).await?;

                Ok(json!({
                    "status": "sent",
                    "message_id": sent.message_id,
                    "wa_id": sent.wa_id,
                    "to": message.recipient.as_str(),
                    "type": message.kind(),
                }))
            },
            Resource::Contact | Resource::Group => Ok(self.not_supported(params)),
        }
    }

    /// Whether the provider answers a read-only lookup
    pub async fn is_available(&self) -> bool {
        self.messenger.is_available().await
    }

    fn not_supported(&self, params: &SendParams) -> serde_json::Value {
        let provider = self.messenger.provider_name();
        debug!(
            resource = %params.resource,
            operation = %params.operation,
            provider,
            "Operation not supported by provider"
        );
        json!({
            "supported": false,
            "resource": params.resource,
            "operation": params.operation,
            "message": format!(
                "{} operations are not supported by {provider}",
                params.resource
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockMessengerPort, SentMessage};
    use mockall::predicate::always;

    fn sent(id: &str) -> SentMessage {
        SentMessage {
            message_id: id.to_string(),
            wa_id: Some("15551234567".to_string()),
        }
    }

    fn service(mock: MockMessengerPort) -> DispatchService {
        DispatchService::new(Arc::new(mock))
    }

    fn batch(items: Vec<SendParams>, continue_on_fail: bool) -> SendBatch {
        SendBatch {
            continue_on_fail,
            items,
        }
    }

    #[test]
    fn builds_text_message() {
        let params = SendParams::text("+1 (555) 123-4567", "hello");
        let msg = build_outbound_message(0, &params).unwrap();
        assert_eq!(msg.recipient.as_str(), "15551234567");
        assert_eq!(
            msg.content,
            MessageContent::Text {
                body: "hello".to_string(),
                preview_url: false
            }
        );
    }

    #[test]
    fn invalid_phone_names_field_and_index() {
        let params = SendParams::text("12345", "hello");
        let err = build_outbound_message(4, &params).unwrap_err();
        let ApplicationError::Validation { item, field, .. } = err else {
            unreachable!("Expected Validation");
        };
        assert_eq!(item, 4);
        assert_eq!(field, "phone_number");
    }

    #[test]
    fn missing_media_url_is_reported() {
        let mut params = SendParams::empty(Resource::Message, Operation::SendImage);
        params.phone_number = Some("15551234567".to_string());
        let err = build_outbound_message(1, &params).unwrap_err();
        let ApplicationError::Validation { field, .. } = err else {
            unreachable!("Expected Validation");
        };
        assert_eq!(field, "media_url");
    }

    #[test]
    fn template_language_defaults() {
        let mut params = SendParams::empty(Resource::Message, Operation::SendTemplate);
        params.phone_number = Some("15551234567".to_string());
        params.template_name = Some("order_update".to_string());
        params.template_parameters = vec!["42".to_string()];

        let msg = build_outbound_message(0, &params).unwrap();
        let MessageContent::Template { language, .. } = msg.content else {
            unreachable!("Expected Template");
        };
        assert_eq!(language, "en_US");
    }

    #[test]
    fn send_params_accept_original_field_names() {
        let params: SendParams = serde_json::from_value(json!({
            "operation": "send_text",
            "phoneNumber": "15551234567",
            "messageText": "hi"
        }))
        .unwrap();
        assert_eq!(params.resource, Resource::Message);
        assert_eq!(params.phone_number.as_deref(), Some("15551234567"));
        assert_eq!(params.text.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn sends_items_in_order() {
        let mut mock = MockMessengerPort::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|m| m.recipient.as_str() == "15551234567")
            .returning(|_| Ok(sent("wamid.1")));
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|m| m.recipient.as_str() == "15557654321")
            .returning(|_| Ok(sent("wamid.2")));

        let results = service(mock)
            .send(batch(
                vec![
                    SendParams::text("15551234567", "one"),
                    SendParams::text("15557654321", "two"),
                ],
                false,
            ))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].item, 0);
        assert_eq!(results[1].item, 1);
        assert_eq!(results[1].data.as_ref().unwrap()["message_id"], "wamid.2");
    }

    #[tokio::test]
    async fn continue_on_fail_records_errors() {
        let mut mock = MockMessengerPort::new();
        mock.expect_send()
            .times(2)
            .returning(|_| Ok(sent("wamid.ok")));

        let results = service(mock)
            .send(batch(
                vec![
                    SendParams::text("15551234567", "one"),
                    SendParams::text("12345", "bad number"),
                    SendParams::text("15551234567", "three"),
                ],
                true,
            ))
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(results[1].item, 1);
        assert_eq!(results[1].kind, Some("validation"));
        assert!(results[1].error.as_ref().unwrap().contains("phone_number"));
        assert!(results[2].success);
    }

    #[tokio::test]
    async fn first_failure_aborts_without_continue() {
        let mut mock = MockMessengerPort::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Err(ApplicationError::Authentication("Invalid token".into())));

        let err = service(mock)
            .send(batch(
                vec![
                    SendParams::text("15551234567", "one"),
                    SendParams::text("15551234567", "two"),
                ],
                false,
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Authentication(_)));
    }

    #[tokio::test]
    async fn invalid_phone_never_reaches_provider() {
        let mut mock = MockMessengerPort::new();
        mock.expect_send().with(always()).never();

        let result = service(mock)
            .send(batch(vec![SendParams::text("12345", "hi")], false))
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Validation { item: 0, .. })
        ));
    }

    #[tokio::test]
    async fn authentication_error_kind_is_preserved() {
        let mut mock = MockMessengerPort::new();
        mock.expect_send()
            .returning(|_| Err(ApplicationError::Authentication("expired".into())));

        let results = service(mock)
            .send(batch(vec![SendParams::text("15551234567", "hi")], true))
            .await
            .unwrap();

        assert_eq!(results[0].kind, Some("authentication"));
    }

    #[tokio::test]
    async fn group_operations_are_not_supported() {
        let mut mock = MockMessengerPort::new();
        mock.expect_send().never();
        mock.expect_provider_name()
            .return_const("WhatsApp Cloud API");

        let results = service(mock)
            .send(batch(
                vec![SendParams::empty(Resource::Group, Operation::Create)],
                false,
            ))
            .await
            .unwrap();

        let data = results[0].data.as_ref().unwrap();
        assert!(results[0].success);
        assert_eq!(data["supported"], false);
        assert_eq!(data["resource"], "group");
        assert!(
            data["message"]
                .as_str()
                .unwrap()
                .contains("WhatsApp Cloud API")
        );
    }

    #[tokio::test]
    async fn mismatched_resource_operation_is_validation_error() {
        let mut mock = MockMessengerPort::new();
        mock.expect_send().never();

        let result = service(mock)
            .send(batch(
                vec![SendParams::empty(Resource::Contact, Operation::SendText)],
                false,
            ))
            .await;

        let Err(ApplicationError::Validation { field, .. }) = result else {
            unreachable!("Expected Validation");
        };
        assert_eq!(field, "operation");
    }

    #[tokio::test]
    async fn availability_delegates_to_port() {
        let mut mock = MockMessengerPort::new();
        mock.expect_is_available().return_const(true);
        assert!(service(mock).is_available().await);
    }
}
