//! Channel-backed workflow sink
//!
//! Hands records to a background consumer without waiting on it.

use application::error::ApplicationError;
use application::ports::WorkflowSink;
use async_trait::async_trait;
use domain::NormalizedMessage;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// `WorkflowSink` that pushes records onto a bounded mpsc channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<NormalizedMessage>,
}

impl ChannelSink {
    #[must_use]
    pub const fn new(tx: mpsc::Sender<NormalizedMessage>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NormalizedMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl WorkflowSink for ChannelSink {
    async fn emit(&self, record: NormalizedMessage) -> Result<(), ApplicationError> {
        match self.tx.try_send(record) {
            Ok(()) => {
                debug!("Record queued for forwarding");
                Ok(())
            },
            Err(TrySendError::Full(_)) => Err(ApplicationError::ExternalService(
                "record queue is full".to_string(),
            )),
            Err(TrySendError::Closed(_)) => Err(ApplicationError::Internal(
                "record forwarder has stopped".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn record(n: i64) -> NormalizedMessage {
        NormalizedMessage::passthrough(json!({ "n": n }), Utc::now())
    }

    #[tokio::test]
    async fn emitted_records_arrive_in_order() {
        let (sink, mut rx) = ChannelSink::channel(8);
        sink.emit(record(1)).await.unwrap();
        sink.emit(record(2)).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().raw["n"], 1);
        assert_eq!(rx.recv().await.unwrap().raw["n"], 2);
    }

    #[tokio::test]
    async fn full_queue_is_reported() {
        let (sink, _rx) = ChannelSink::channel(1);
        sink.emit(record(1)).await.unwrap();
        let err = sink.emit(record(2)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ExternalService(_)));
    }

    #[tokio::test]
    async fn closed_queue_is_reported() {
        let (sink, rx) = ChannelSink::channel(1);
        drop(rx);
        let err = sink.emit(record(1)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Internal(_)));
    }
}
