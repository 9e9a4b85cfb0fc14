//! Record forwarding task
//!
//! Drains normalized webhook records from the sink channel, logs each one and,
//! when a forward URL is configured, POSTs it as JSON to the workflow engine.
//! Delivery failures are logged and the record is dropped.

use std::time::Duration;

use domain::NormalizedMessage;
use infrastructure::ForwardConfig;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

/// Errors delivering a record to the workflow engine
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Workflow engine returned HTTP {0}")]
    Status(u16),
}

/// Delivers records to the configured workflow engine URL
#[derive(Debug, Clone)]
pub struct RecordForwarder {
    client: reqwest::Client,
    url: Option<String>,
}

impl RecordForwarder {
    /// Build a forwarder from config
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ForwardConfig) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Target URL, if forwarding is enabled
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Log one record and forward it if a URL is configured
    #[instrument(skip(self, record), fields(message_id = ?record.message_id, kind = %record.message_type))]
    pub async fn forward(&self, record: &NormalizedMessage) -> Result<(), ForwardError> {
        info!(
            from = ?record.from,
            source = ?record.source,
            extracted = record.is_extracted(),
            "📨 WhatsApp record received"
        );

        let Some(url) = self.url.as_deref() else {
            return Ok(());
        };

        let response = self.client.post(url).json(record).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status.as_u16()));
        }

        debug!(status = status.as_u16(), "Record forwarded");
        Ok(())
    }
}

/// Spawn the consumer loop; it ends once every sender has been dropped
pub fn spawn_record_forwarder(
    mut rx: mpsc::Receiver<NormalizedMessage>,
    forwarder: RecordForwarder,
) -> tokio::task::JoinHandle<()> {
    info!(
        url = forwarder.url().unwrap_or("<log only>"),
        "Starting record forwarder"
    );

    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            if let Err(e) = forwarder.forward(&record).await {
                error!(error = %e, message_id = ?record.message_id, "Failed to forward record");
            }
        }
        info!("Record forwarder stopped");
    })
}
