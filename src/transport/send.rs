use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::text::TransportText;
use super::{Decoded, Endpoint, TransportError, parse_object};
use crate::config::SmsUpConfig;
use crate::domain::{ApiKey, Encoding, MessageResult, OutboundMessage, SendAt, SendOptions, SendResult};

/// A composed send: where to post and what.
#[derive(Debug, Clone, PartialEq)]
pub struct SendRequest {
    pub endpoint: Endpoint,
    pub payload: Value,
}

#[derive(Debug, Serialize)]
struct SendJsonPayload<'a> {
    api_key: &'a str,
    messages: Vec<OutboundMessage>,
    concat: u8,
    fake: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<Encoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageJsonResult {
    #[serde(default)]
    status: Option<TransportText>,
    #[serde(default)]
    sms_id: Option<TransportText>,
    #[serde(default)]
    custom: Option<TransportText>,
    #[serde(default)]
    error_id: Option<TransportText>,
    #[serde(default)]
    error_msg: Option<TransportText>,
}

/// Build the send payload for an already validated batch.
///
/// The first message decides the endpoint: when it carries a link the whole
/// batch goes to `send-link` with that link at the top level. Links on later
/// messages never switch the endpoint.
pub fn compose_send_request(
    api_key: &ApiKey,
    messages: &[OutboundMessage],
    options: &SendOptions,
    config: &SmsUpConfig,
    webhook_url: Option<&str>,
    now: SendAt,
) -> Result<SendRequest, TransportError> {
    let stamped = messages
        .iter()
        .map(|message| {
            let mut message = message.clone();
            if message.send_at.as_deref().is_none_or(str::is_empty) {
                message.send_at = Some(now.to_string());
            }
            message
        })
        .collect::<Vec<_>>();

    let encoding = options.encoding.unwrap_or(config.defaults.encoding);
    let report_url = [
        options.report_url.as_deref(),
        config.defaults.report_url.as_deref(),
        webhook_url,
    ]
    .into_iter()
    .flatten()
    .find(|url| !url.is_empty());
    let link = messages.first().and_then(OutboundMessage::link);

    let payload = SendJsonPayload {
        api_key: api_key.as_str(),
        messages: stamped,
        concat: u8::from(options.concat.unwrap_or(config.defaults.concat)),
        fake: u8::from(options.fake.unwrap_or(config.test_mode)),
        encoding: (encoding == Encoding::Ucs2).then_some(encoding),
        report_url,
        link,
    };

    Ok(SendRequest {
        endpoint: if link.is_some() {
            Endpoint::SendLink
        } else {
            Endpoint::Send
        },
        payload: serde_json::to_value(payload)?,
    })
}

/// Decode a send response into a [`SendResult`].
///
/// `result` entries that are not objects, or that carry no `status` of their
/// own, are skipped.
pub fn decode_send_json_response(json: &str) -> Result<Decoded<SendResult>, TransportError> {
    let (envelope, body) = parse_object(json)?;

    let items = match body.get("result") {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };
    let messages = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| decode_message_result(index, item))
        .collect::<Vec<_>>();

    let value = SendResult {
        status: envelope.status.clone(),
        error_id: envelope.error_id.clone(),
        error_message: envelope.error_message.clone(),
        messages,
    };
    Ok(Decoded {
        envelope,
        value,
        body,
    })
}

fn decode_message_result(index: usize, item: &Value) -> Option<MessageResult> {
    if !item.is_object() {
        tracing::debug!(index, "skipping non-object send result entry");
        return None;
    }
    let parsed = match MessageJsonResult::deserialize(item) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(index, error = %err, "skipping malformed send result entry");
            return None;
        }
    };
    let Some(status) = parsed.status else {
        tracing::debug!(index, "skipping send result entry without status");
        return None;
    };
    Some(MessageResult {
        status: status.into_string(),
        sms_id: parsed.sms_id.map(TransportText::into_string),
        custom: parsed.custom.map(TransportText::into_string),
        error_id: parsed.error_id.map(TransportText::into_string),
        error_message: parsed.error_msg.map(TransportText::into_string),
    })
}
