//! Value Objects - Immutable, identity-less domain primitives

mod message_type;
mod phone_number;

pub use message_type::MessageType;
pub use phone_number::PhoneNumber;
