//! Route definitions

use axum::{
    Router,
    routing::{any, get, post},
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::{handlers, middleware::RequestIdLayer, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_body_size_bytes;

    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Batch send API (v1)
        .route("/v1/messages", post(handlers::messages::send_messages))
        // WhatsApp webhook; the handler answers every method itself
        .route("/webhook/whatsapp", any(handlers::webhook::whatsapp_webhook))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(RequestIdLayer::new())
        // Attach state
        .with_state(state)
}
