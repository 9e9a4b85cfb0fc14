//! Background tasks for the HTTP presentation layer

mod record_forwarder;

pub use record_forwarder::{ForwardError, RecordForwarder, spawn_record_forwarder};
