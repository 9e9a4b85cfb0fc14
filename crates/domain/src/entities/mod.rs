//! Domain entities - inbound records and outbound messages

mod normalized_message;
mod outbound_message;

pub use normalized_message::{
    InteractiveReply, LocationInfo, MediaInfo, NormalizedMessage, PayloadSource,
};
pub use outbound_message::{
    MAX_BUTTON_TITLE_LEN, MAX_REPLY_BUTTONS, MAX_TEXT_LEN, MessageContent, OutboundMessage,
    ReplyButton,
};
