//! WhatsApp webhook route
//!
//! Thin axum shim over `WebhookHandler`: the request is copied into a
//! framework-neutral `WebhookRequest` and the handler decides the response.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method},
    response::IntoResponse,
};
use integration_whatsapp::WebhookRequest;

use crate::state::AppState;

/// Any-method webhook endpoint (GET handshake, POST delivery)
pub async fn whatsapp_webhook(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = WebhookRequest {
        method,
        query,
        headers,
        body,
    };

    state.webhook.handle(request).await
}
