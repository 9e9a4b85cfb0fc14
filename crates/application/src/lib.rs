//! Application layer - Use cases and orchestration
//!
//! Defines the ports the WhatsApp integration plugs into and the batch
//! dispatch use case that drives outbound sends.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
