//! WaBridge HTTP Server
//!
//! Main entry point: webhook receiver, batch send API and record forwarder.

use std::{sync::Arc, time::Duration};

use application::DispatchService;
use infrastructure::{AppConfig, ChannelSink, WhatsAppMessengerAdapter, init_telemetry};
use integration_whatsapp::WebhookHandler;
use presentation_http::{RecordForwarder, routes, spawn_record_forwarder, state::AppState};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration first: it carries the log filter
    let config_result = AppConfig::load();
    let config = config_result.as_ref().cloned().unwrap_or_default();

    init_telemetry(&config.telemetry)?;

    info!("🤖 WaBridge v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = &config_result {
        warn!("Failed to load config, using defaults: {}", e);
    }
    for warning in config.validate() {
        warn!("⚠️  {warning}");
    }

    info!(
        host = %config.server.host,
        port = %config.server.port,
        webhook_auth = config.whatsapp.webhook_config().auth.name(),
        forward_url = config.forward.url.as_deref().unwrap_or("<log only>"),
        "Configuration loaded"
    );

    // Inbound: webhook handler -> channel -> forwarder task
    let (sink, records) = ChannelSink::channel(config.forward.channel_capacity);
    let forwarder = RecordForwarder::new(&config.forward)
        .map_err(|e| anyhow::anyhow!("Failed to initialize record forwarder: {e}"))?;
    let forwarder_handle = spawn_record_forwarder(records, forwarder);

    let webhook = WebhookHandler::new(config.whatsapp.webhook_config(), Arc::new(sink));

    // Outbound: only with Cloud API credentials
    let dispatch = if config.whatsapp.has_credentials() {
        let adapter = WhatsAppMessengerAdapter::new(config.whatsapp.client_config())
            .map_err(|e| anyhow::anyhow!("Failed to initialize WhatsApp client: {e}"))?;
        Some(DispatchService::new(Arc::new(adapter)))
    } else {
        None
    };

    let state = AppState::new(webhook, dispatch, config.clone());
    let app = routes::create_router(state);

    // Configure CORS layer
    let cors_layer = if config.server.allowed_origins.is_empty() {
        // Development mode: allow all origins
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use axum::http::{HeaderValue, Method};
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    };

    // Add middleware (order matters: last added = outermost)
    let app = app.layer(TraceLayer::new_for_http());
    let app = if config.server.cors_enabled {
        app.layer(cors_layer)
    } else {
        app
    };

    // Start server
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 Server listening on http://{}", addr);
    info!("📥 Webhook: http://{}/webhook/whatsapp", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    // The router (and with it the last sink) is gone; let queued records drain
    if tokio::time::timeout(shutdown_timeout, forwarder_handle)
        .await
        .is_err()
    {
        warn!("Record forwarder did not drain before the shutdown timeout");
    }

    info!("👋 Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("📥 Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("📥 Received SIGTERM, initiating graceful shutdown...");
        }
    }

    info!("⏳ Waiting up to {:?} for connections to close...", timeout);
}
