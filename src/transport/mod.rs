//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod account;
mod report;
mod send;
mod text;

use serde::Deserialize;
use serde_json::Value;

use text::TransportText;

use crate::domain::SendResult;

pub use account::{
    decode_balance_json_response, decode_phone_check_json_response, encode_balance_payload,
    encode_phone_check_payload,
};
pub use report::decode_delivery_reports;
pub use send::{compose_send_request, decode_send_json_response};

/// Gateway endpoints, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Send,
    SendLink,
    PhoneCheck,
    Balance,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Send => "3.0/sms/send",
            Self::SendLink => "3.0/sms/send-link",
            Self::PhoneCheck => "hlr/request",
            Self::Balance => "3.0/account/get-balance",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON {expected} at the top level")]
    UnexpectedShape { expected: &'static str },

    #[error("response is missing field `{field}`")]
    MissingField { field: &'static str },
}

/// Gateway status plus error details, common to every response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub status: String,
    pub error_id: Option<String>,
    pub error_message: Option<String>,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// A decoded response together with the raw JSON it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub envelope: Envelope,
    pub value: T,
    pub body: Value,
}

fn parse_object(json: &str) -> Result<(Envelope, Value), TransportError> {
    let body: Value = serde_json::from_str(json)?;
    if !body.is_object() {
        return Err(TransportError::UnexpectedShape { expected: "object" });
    }
    let envelope = Envelope {
        status: envelope_field(&body, "status")
            .unwrap_or_else(|| SendResult::UNKNOWN_STATUS.to_owned()),
        error_id: envelope_field(&body, "error_id"),
        error_message: envelope_field(&body, "error_msg"),
    };
    Ok((envelope, body))
}

/// Non-scalar values are treated as absent.
fn envelope_field(body: &Value, field: &'static str) -> Option<String> {
    let value = body.get(field).filter(|value| !value.is_null())?;
    match TransportText::deserialize(value) {
        Ok(text) => Some(text.into_string()),
        Err(err) => {
            tracing::debug!(field, error = %err, "ignoring undecodable envelope field");
            None
        }
    }
}
