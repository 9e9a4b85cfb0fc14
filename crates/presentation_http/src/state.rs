//! Application state shared across handlers

use std::{fmt, sync::Arc};

use application::DispatchService;
use infrastructure::AppConfig;
use integration_whatsapp::WebhookHandler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Inbound webhook handling
    pub webhook: Arc<WebhookHandler>,
    /// Outbound batch sends; `None` when no Cloud API credentials are configured
    pub dispatch: Option<Arc<DispatchService>>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        webhook: WebhookHandler,
        dispatch: Option<DispatchService>,
        config: AppConfig,
    ) -> Self {
        Self {
            webhook: Arc::new(webhook),
            dispatch: dispatch.map(Arc::new),
            config: Arc::new(config),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("webhook", &self.webhook)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}
