//! Batch validation with per-item error aggregation.

use serde::Deserialize;

use crate::domain::encoding::Encoding;
use crate::domain::request::{MessageSpec, OutboundMessage};
use crate::domain::validation::ValidationError;
use crate::domain::value::{SenderLimits, is_valid_phone_format, is_valid_sender_format};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Max accepted text length per encoding, concatenation included.
pub struct MaxMessageLength {
    #[serde(rename = "GSM7", alias = "gsm7")]
    pub gsm7: usize,
    #[serde(rename = "UCS2", alias = "ucs2")]
    pub ucs2: usize,
}

impl MaxMessageLength {
    pub fn for_encoding(self, encoding: Encoding) -> usize {
        match encoding {
            Encoding::Gsm7 => self.gsm7,
            Encoding::Ucs2 => self.ucs2,
        }
    }
}

impl Default for MaxMessageLength {
    fn default() -> Self {
        Self {
            gsm7: 459,
            ucs2: 201,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Configuration snapshot a batch is validated against.
pub struct ValidationContext {
    pub default_from: Option<String>,
    pub default_encoding: Encoding,
    pub validate_phone_format: bool,
    pub max_custom_length: usize,
    pub max_message_length: MaxMessageLength,
    pub sender_limits: SenderLimits,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            default_from: None,
            default_encoding: Encoding::Gsm7,
            validate_phone_format: true,
            max_custom_length: 32,
            max_message_length: MaxMessageLength::default(),
            sender_limits: SenderLimits::default(),
        }
    }
}

/// Validates raw batch items against a [`ValidationContext`].
#[derive(Debug, Clone)]
pub struct MessageValidator {
    context: ValidationContext,
}

impl MessageValidator {
    pub fn new(context: ValidationContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Validate every item and apply defaults.
    ///
    /// The batch is accepted or rejected as a whole: any violation in any item
    /// yields a single [`ValidationError::Failed`] listing all of them, tagged
    /// with the item index.
    pub fn validate_batch(
        &self,
        messages: &[MessageSpec],
    ) -> Result<Vec<OutboundMessage>, ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::Failed {
                errors: vec!["no messages provided".to_owned()],
            });
        }

        let mut errors = Vec::new();
        let mut validated = Vec::with_capacity(messages.len());
        for (index, message) in messages.iter().enumerate() {
            match self.validate_item(index, message) {
                Ok(item) => validated.push(item),
                Err(item_errors) => errors.extend(item_errors),
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(ValidationError::Failed { errors })
        }
    }

    fn validate_item(
        &self,
        index: usize,
        message: &MessageSpec,
    ) -> Result<OutboundMessage, Vec<String>> {
        let ctx = &self.context;
        let mut errors = Vec::new();
        let tag = |detail: String| format!("message #{index}: {detail}");

        let to = non_empty(&message.to);
        match to {
            None => errors.push(tag("missing recipient".to_owned())),
            Some(to) if ctx.validate_phone_format && !is_valid_phone_format(to) => {
                errors.push(tag(format!("invalid phone format '{to}'")));
            }
            Some(_) => {}
        }

        let encoding = match non_empty(&message.encoding) {
            Some(raw) => match Encoding::parse(raw) {
                Ok(encoding) => Some(encoding),
                Err(err) => {
                    errors.push(tag(err.to_string()));
                    None
                }
            },
            None => Some(ctx.default_encoding),
        };

        let text = non_empty(&message.text);
        match text {
            None => errors.push(tag("message text must not be empty".to_owned())),
            Some(text) => {
                if let Some(encoding) = encoding {
                    let max = ctx.max_message_length.for_encoding(encoding);
                    let length = text.chars().count();
                    if length > max {
                        errors.push(tag(
                            ValidationError::MessageTooLong {
                                length,
                                max,
                                encoding,
                            }
                            .to_string(),
                        ));
                    }
                }
            }
        }

        let from = match non_empty(&message.from) {
            Some(from) => {
                if !is_valid_sender_format(from, ctx.sender_limits) {
                    errors.push(tag(format!("invalid sender format '{from}'")));
                }
                Some(from.to_owned())
            }
            None => {
                let default = ctx.default_from.as_deref().filter(|from| !from.is_empty());
                if default.is_none() {
                    errors.push(tag(
                        "missing sender and no default sender is configured".to_owned(),
                    ));
                }
                default.map(str::to_owned)
            }
        };

        if let Some(custom) = non_empty(&message.custom) {
            let length = custom.chars().count();
            if length > ctx.max_custom_length {
                errors.push(tag(format!(
                    "custom field is too long ({length} characters, max {})",
                    ctx.max_custom_length
                )));
            }
        }

        let (Some(to), Some(text), true) = (to, text, errors.is_empty()) else {
            return Err(errors);
        };
        Ok(OutboundMessage {
            to: to.to_owned(),
            from,
            text: text.to_owned(),
            link: non_empty(&message.link).map(str::to_owned),
            send_at: non_empty(&message.send_at).map(str::to_owned),
            custom: non_empty(&message.custom).map(str::to_owned),
            encoding,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
