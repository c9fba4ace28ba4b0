//! Domain layer: strong types with validation and invariants (no I/O).

mod encoding;
mod event;
mod message;
mod request;
mod response;
mod validation;
mod validator;
mod value;

pub use encoding::{Encoding, EncodingLimits, EncodingPolicy};
pub use event::SmsEvent;
pub use message::{Message, MessageBuilder};
pub use request::{MessageSpec, OutboundMessage, SendOptions};
pub use response::{DeliveryReport, MessageResult, MessageStatus, SendResult};
pub use validation::ValidationError;
pub use validator::{MaxMessageLength, MessageValidator, ValidationContext};
pub use value::{
    ApiKey, CustomTag, PHONE_MAX_DIGITS, PHONE_MIN_DIGITS, Recipient, SendAt, SenderId,
    SenderLimits, is_valid_phone_format, is_valid_sender_format,
};
