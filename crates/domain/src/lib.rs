//! Domain layer for WaBridge
//!
//! Contains the messaging vocabulary shared by the webhook handler and the
//! outbound sender: phone numbers, message types, normalized inbound records
//! and typed outbound messages. No I/O happens in this crate.

pub mod commands;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use commands::{Operation, Resource};
pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
