use serde::Deserialize;
use serde::de::Error as DeError;
use serde_json::{Value, json};

use super::{Decoded, TransportError, parse_object};
use crate::domain::{ApiKey, Recipient};

/// Result of an HLR lookup (`hlr/request`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneCheckResponse {
    pub success: bool,
}

/// Result of `account/get-balance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceResponse {
    pub balance: Option<String>,
}

/// Balance sent as a JSON string or number.
///
/// Numbers keep their raw token, so `10.00` stays `"10.00"`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TransportMoney(String);

impl<'de> Deserialize<'de> for TransportMoney {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: Box<serde_json::value::RawValue> = Deserialize::deserialize(deserializer)?;
        let token = raw.get();

        match token.as_bytes().first().copied() {
            Some(b'"') => serde_json::from_str::<String>(token)
                .map(Self)
                .map_err(D::Error::custom),
            Some(b'-' | b'0'..=b'9') => Ok(Self(token.to_owned())),
            _ => Err(D::Error::custom("expected balance to be a JSON string or number")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PhoneCheckJsonResult {
    #[serde(default)]
    success: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BalanceJsonResponse {
    #[serde(default)]
    result: Option<BalanceJsonResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BalanceJsonResult {
    #[serde(default)]
    balance: Option<TransportMoney>,
}

pub fn encode_phone_check_payload(api_key: &ApiKey, msisdn: &Recipient) -> Value {
    json!({
        "api_key": api_key.as_str(),
        "msisdn": msisdn.as_str(),
    })
}

pub fn encode_balance_payload(api_key: &ApiKey) -> Value {
    json!({ "api_key": api_key.as_str() })
}

/// `result.success` is `false` when absent or not a boolean.
pub fn decode_phone_check_json_response(
    json: &str,
) -> Result<Decoded<PhoneCheckResponse>, TransportError> {
    let (envelope, body) = parse_object(json)?;
    let success = body
        .get("result")
        .filter(|result| result.is_object())
        .and_then(|result| PhoneCheckJsonResult::deserialize(result).ok())
        .and_then(|result| result.success)
        .unwrap_or(false);
    Ok(Decoded {
        envelope,
        value: PhoneCheckResponse { success },
        body,
    })
}

/// The balance is only read when the gateway reports `ok`.
pub fn decode_balance_json_response(
    json: &str,
) -> Result<Decoded<BalanceResponse>, TransportError> {
    let (envelope, body) = parse_object(json)?;
    let balance = if envelope.is_ok() {
        let parsed: BalanceJsonResponse = serde_json::from_str(json)?;
        parsed
            .result
            .and_then(|result| result.balance)
            .map(|money| money.0)
    } else {
        None
    };
    Ok(Decoded {
        envelope,
        value: BalanceResponse { balance },
        body,
    })
}
