//! Typed Rust client for the SmsUp (Gateway360) SMS HTTP API.
//!
//! The crate is split in three layers: a domain layer of validated types with
//! no I/O, a transport layer for the gateway's JSON payloads, and a small
//! client layer that validates, sends and maps responses.
//!
//! ```rust,no_run
//! use smsup::{MessageSpec, SendOptions, SmsUpClient, SmsUpConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smsup::SmsUpError> {
//!     let mut config = SmsUpConfig::from_env();
//!     config.defaults.from = Some("Shop".to_owned());
//!     let client = SmsUpClient::new(config)?;
//!
//!     let batch = [MessageSpec::new("34666666666", "Your order has shipped")];
//!     let result = client.send_messages(&batch, &SendOptions::default()).await?;
//!     println!("{} of {} accepted", result.successful_message_count(), result.message_count());
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
mod transport;

pub use client::{
    EventPublisher, HttpResponse, HttpTransport, SmsUpClient, SmsUpClientBuilder, SmsUpError,
    parse_delivery_reports,
};
pub use config::SmsUpConfig;
pub use domain::{
    DeliveryReport, Encoding, EncodingPolicy, Message, MessageBuilder, MessageResult,
    MessageSpec, MessageStatus, SendAt, SendOptions, SendResult, SmsEvent, ValidationError,
};
