//! Workflow sink port - where normalized inbound records go

use async_trait::async_trait;
use domain::NormalizedMessage;

use crate::error::ApplicationError;

/// Receives normalized records and hands them to the workflow engine
#[async_trait]
pub trait WorkflowSink: Send + Sync {
    /// Emit one record; ownership passes to the engine
    async fn emit(&self, record: NormalizedMessage) -> Result<(), ApplicationError>;
}
