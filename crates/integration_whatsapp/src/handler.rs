//! Webhook request handling
//!
//! Stateless per request: pick an action from the HTTP method, then verify the
//! subscription handshake or authenticate, normalize and emit the delivery.

use std::{collections::HashMap, fmt, sync::Arc};

use application::ports::WorkflowSink;
use axum::{
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

use crate::webhook::{
    META_OBJECT, WebhookAuth, WebhookConfig, WebhookPayload, tokens_match, verify_signature,
};

/// Header carrying the shared token in `token` auth mode
pub const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";
/// Meta signature headers, in lookup order
pub const SIGNATURE_HEADERS: [&str; 2] = ["x-hub-signature-256", "x-hub-signature"];

/// What to do with a request, decided by its method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    /// GET: subscription handshake
    Verify,
    /// POST: message delivery
    Process,
    /// Anything else
    Reject,
}

impl WebhookAction {
    #[must_use]
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::GET => Self::Verify,
            Method::POST => Self::Process,
            _ => Self::Reject,
        }
    }
}

/// An inbound webhook call
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl WebhookRequest {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: HashMap::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header; invalid header names or values are ignored
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Response to a webhook call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl WebhookResponse {
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    #[must_use]
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    /// 200 `{"success": true}`
    #[must_use]
    pub fn ack() -> Self {
        Self::json(StatusCode::OK, &json!({"success": true}))
    }

    fn unauthorized(message: &str) -> Self {
        Self::json(StatusCode::UNAUTHORIZED, &json!({"error": message}))
    }
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response();
        if self.status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET, POST"));
        }
        response
    }
}

/// Whether the raw body is a JSON object sent by Meta
fn is_meta_envelope(body: &[u8]) -> bool {
    serde_json::from_slice::<Value>(body)
        .is_ok_and(|v| v.get("object").and_then(Value::as_str) == Some(META_OBJECT))
}

/// Handles webhook calls and emits normalized records to a sink
#[derive(Clone)]
pub struct WebhookHandler {
    config: WebhookConfig,
    sink: Arc<dyn WorkflowSink>,
}

impl fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WebhookHandler {
    #[must_use]
    pub fn new(config: WebhookConfig, sink: Arc<dyn WorkflowSink>) -> Self {
        Self { config, sink }
    }

    #[must_use]
    pub const fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Handle one webhook call
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle(&self, request: WebhookRequest) -> WebhookResponse {
        match WebhookAction::from_method(&request.method) {
            WebhookAction::Verify => self.verify(&request),
            WebhookAction::Process => self.process(&request).await,
            WebhookAction::Reject => {
                debug!("Rejecting unsupported webhook method");
                WebhookResponse::json(
                    StatusCode::METHOD_NOT_ALLOWED,
                    &json!({"error": "Method Not Allowed"}),
                )
            },
        }
    }

    fn verify(&self, request: &WebhookRequest) -> WebhookResponse {
        let mode = request.query.get("hub.mode").map(String::as_str);
        let challenge = request.query.get("hub.challenge");

        let (Some("subscribe"), Some(challenge)) = (mode, challenge) else {
            debug!(mode = ?mode, "Webhook verification missing subscribe mode or challenge");
            return WebhookResponse::text(StatusCode::BAD_REQUEST, "Bad Request");
        };

        let provided = request
            .query
            .get("hub.verify_token")
            .map_or("", String::as_str);

        if tokens_match(&self.config.verify_token, provided) {
            info!("✅ WhatsApp webhook verified successfully");
            WebhookResponse::text(StatusCode::OK, challenge.clone())
        } else {
            warn!("WhatsApp webhook verification failed: token mismatch");
            WebhookResponse::text(StatusCode::FORBIDDEN, "Forbidden")
        }
    }

    async fn process(&self, request: &WebhookRequest) -> WebhookResponse {
        if let WebhookAuth::Meta { app_secret } = &self.config.auth {
            let Some(signature) = SIGNATURE_HEADERS.iter().find_map(|h| request.header(h)) else {
                warn!("Webhook delivery without Meta signature");
                return WebhookResponse::unauthorized("No signature provided");
            };
            if !verify_signature(&request.body, signature, app_secret) {
                warn!("WhatsApp webhook signature verification failed");
                return WebhookResponse::unauthorized("Invalid signature");
            }
        }

        if let WebhookAuth::Token(expected) = &self.config.auth {
            // Meta cannot send custom headers
            let provided = request.header(WEBHOOK_TOKEN_HEADER).unwrap_or("");
            if !is_meta_envelope(&request.body) && !tokens_match(expected, provided) {
                warn!("Webhook token authentication failed");
                return WebhookResponse::unauthorized("Unauthorized");
            }
        }

        let body = match serde_json::from_slice::<Value>(&request.body) {
            Ok(body @ Value::Object(_)) => body,
            _ => {
                debug!(len = request.body.len(), "Webhook body is not a JSON object");
                return WebhookResponse::json(
                    StatusCode::BAD_REQUEST,
                    &json!({"success": false, "error": "Invalid body format"}),
                );
            },
        };

        let payload = match WebhookPayload::classify(&body) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Failed to parse WhatsApp webhook payload");
                return WebhookResponse::ack();
            },
        };

        let Some(record) = payload.normalize(&body, Utc::now()) else {
            debug!(
                kind = payload.kind(),
                "No messages in webhook payload (might be status update)"
            );
            return WebhookResponse::ack();
        };

        if record.is_extracted() && !self.config.allows(record.message_type) {
            debug!(message_type = %record.message_type, "Message type not in allowlist, skipping");
            return WebhookResponse::ack();
        }

        info!(
            kind = payload.kind(),
            message_type = %record.message_type,
            message_id = record.message_id.as_deref().unwrap_or("-"),
            "📨 Webhook delivery normalized"
        );

        if let Err(e) = self.sink.emit(record).await {
            error!(error = %e, "Failed to emit webhook record");
        }

        WebhookResponse::ack()
    }
}
