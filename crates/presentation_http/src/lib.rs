//! WaBridge HTTP presentation layer
//!
//! Hosts the WhatsApp webhook and the batch send API behind an axum router.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod tasks;

pub use error::ApiError;
pub use middleware::{RequestId, RequestIdLayer, ValidatedJson, ValidationError};
pub use routes::create_router;
pub use state::AppState;
pub use tasks::{RecordForwarder, spawn_record_forwarder};
