//! Application services - Use case implementations

mod dispatch_service;

pub use dispatch_service::{
    ButtonParam, DispatchService, ItemResult, SendBatch, SendParams, build_outbound_message,
};
