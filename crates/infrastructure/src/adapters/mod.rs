//! Adapters implementing application ports

mod channel_sink;
mod whatsapp_messenger_adapter;

pub use channel_sink::ChannelSink;
pub use whatsapp_messenger_adapter::{WhatsAppMessengerAdapter, map_whatsapp_error};
