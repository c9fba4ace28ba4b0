//! Single-message drafts.
//!
//! [`MessageBuilder`] rejects a bad value at the setter that introduced it;
//! cross-field checks (required fields, text length against the final
//! encoding) happen when the draft is validated or built.

use serde_json::{Map, Value};

use crate::domain::encoding::{Encoding, EncodingPolicy};
use crate::domain::request::MessageSpec;
use crate::domain::validation::ValidationError;
use crate::domain::value::{CustomTag, Recipient, SendAt, SenderId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Draft of one outbound SMS.
pub struct MessageBuilder {
    to: Option<Recipient>,
    from: Option<SenderId>,
    text: Option<String>,
    link: Option<String>,
    send_at: Option<SendAt>,
    custom: Option<CustomTag>,
    encoding: Option<Encoding>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`ValidationError::InvalidPhoneFormat`] unless the value is 8–15 digits.
    pub fn to(mut self, value: impl Into<String>) -> Result<Self, ValidationError> {
        self.to = Some(Recipient::new(value)?);
        Ok(self)
    }

    /// Use an already validated recipient.
    pub fn recipient(mut self, recipient: Recipient) -> Self {
        self.to = Some(recipient);
        self
    }

    /// Fails with [`ValidationError::InvalidSenderFormat`].
    pub fn from(mut self, value: impl Into<String>) -> Result<Self, ValidationError> {
        self.from = Some(SenderId::new(value)?);
        Ok(self)
    }

    /// Fails with [`ValidationError::MissingMessage`] for empty text.
    pub fn text(mut self, value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::MissingMessage);
        }
        self.text = Some(value);
        Ok(self)
    }

    pub fn link(mut self, value: impl Into<String>) -> Self {
        self.link = Some(value.into());
        self
    }

    /// Fails with [`ValidationError::Configuration`] above 32 characters.
    pub fn custom(mut self, value: impl Into<String>) -> Result<Self, ValidationError> {
        self.custom = Some(CustomTag::new(value)?);
        Ok(self)
    }

    /// Case-insensitive; fails with [`ValidationError::InvalidEncoding`].
    pub fn encoding(mut self, value: &str) -> Result<Self, ValidationError> {
        self.encoding = Some(Encoding::parse(value)?);
        Ok(self)
    }

    pub fn schedule_at(mut self, send_at: SendAt) -> Self {
        self.send_at = Some(send_at);
        self
    }

    pub fn schedule_now(self) -> Self {
        self.schedule_at(SendAt::now())
    }

    pub fn schedule_in_minutes(self, minutes: i64) -> Self {
        self.schedule_at(SendAt::in_minutes(minutes))
    }

    pub fn schedule_in_hours(self, hours: i64) -> Self {
        self.schedule_at(SendAt::in_hours(hours))
    }

    pub fn has_recipient(&self) -> bool {
        self.to.is_some()
    }

    /// Segments the current text needs (GSM7 if no encoding was chosen).
    pub fn segment_count(&self) -> usize {
        EncodingPolicy::segment_count(
            self.text.as_deref().unwrap_or_default(),
            self.encoding.unwrap_or_default(),
        )
    }

    /// Final gate before sending: reports every missing required field at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = self.missing_fields();
        if self.from.is_none() {
            errors.push(format!("{} is required", SenderId::FIELD));
        }
        self.check_text_length(&mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Failed { errors })
        }
    }

    /// Build a [`Message`]. Only `to` and `text` are required; the sender may
    /// come from configuration when the message is sent.
    pub fn build(self) -> Result<Message, ValidationError> {
        let mut errors = self.missing_fields();
        self.check_text_length(&mut errors);
        let (Some(to), Some(text), true) = (self.to, self.text, errors.is_empty()) else {
            return Err(ValidationError::Failed { errors });
        };
        Ok(Message {
            to,
            from: self.from,
            text,
            link: self.link,
            send_at: self.send_at,
            custom: self.custom,
            encoding: self.encoding,
        })
    }

    fn missing_fields(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.to.is_none() {
            errors.push(format!("{} is required", Recipient::FIELD));
        }
        if self.text.is_none() {
            errors.push("text is required".to_owned());
        }
        errors
    }

    fn check_text_length(&self, errors: &mut Vec<String>) {
        if let Some(text) = self.text.as_deref() {
            let encoding = self.encoding.unwrap_or_default();
            let max = EncodingPolicy::limits(encoding).batch_max;
            let length = text.chars().count();
            if length > max {
                errors.push(
                    ValidationError::MessageTooLong {
                        length,
                        max,
                        encoding,
                    }
                    .to_string(),
                );
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A complete single message, ready to be sent.
pub struct Message {
    to: Recipient,
    from: Option<SenderId>,
    text: String,
    link: Option<String>,
    send_at: Option<SendAt>,
    custom: Option<CustomTag>,
    encoding: Option<Encoding>,
}

impl Message {
    pub fn builder() -> MessageBuilder {
        MessageBuilder::new()
    }

    pub fn to(&self) -> &Recipient {
        &self.to
    }

    pub fn from(&self) -> Option<&SenderId> {
        self.from.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn send_at(&self) -> Option<SendAt> {
        self.send_at
    }

    pub fn custom(&self) -> Option<&CustomTag> {
        self.custom.as_ref()
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn segment_count(&self) -> usize {
        EncodingPolicy::segment_count(&self.text, self.encoding.unwrap_or_default())
    }

    /// Wire-format mapping. Unset optional fields are omitted; `send_at` is
    /// always present and defaults to the current time.
    pub fn serialize(&self) -> Value {
        self.serialize_at(SendAt::now())
    }

    /// Like [`Message::serialize`] with an explicit fallback for `send_at`.
    pub fn serialize_at(&self, now: SendAt) -> Value {
        let mut payload = Map::new();
        payload.insert(Recipient::FIELD.to_owned(), self.to.as_str().into());
        if let Some(from) = self.from.as_ref() {
            payload.insert(SenderId::FIELD.to_owned(), from.as_str().into());
        }
        payload.insert("text".to_owned(), self.text.as_str().into());
        if let Some(link) = self.link.as_deref().filter(|link| !link.is_empty()) {
            payload.insert("link".to_owned(), link.into());
        }
        payload.insert(
            SendAt::FIELD.to_owned(),
            self.send_at.unwrap_or(now).to_string().into(),
        );
        if let Some(custom) = self.custom.as_ref() {
            payload.insert(CustomTag::FIELD.to_owned(), custom.as_str().into());
        }
        if let Some(encoding) = self.encoding {
            payload.insert(Encoding::FIELD.to_owned(), encoding.as_str().into());
        }
        Value::Object(payload)
    }

    /// Raw batch item for the validated batch path.
    pub fn to_spec(&self) -> MessageSpec {
        MessageSpec {
            to: Some(self.to.as_str().to_owned()),
            from: self.from.as_ref().map(|from| from.as_str().to_owned()),
            text: Some(self.text.clone()),
            link: self.link.clone(),
            send_at: self.send_at.map(|at| at.to_string()),
            custom: self.custom.as_ref().map(|custom| custom.as_str().to_owned()),
            encoding: self.encoding.map(|encoding| encoding.as_str().to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn fixed_time() -> SendAt {
        SendAt::new(
            NaiveDate::from_ymd_opt(2025, 1, 2)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        )
    }

    #[test]
    fn setters_reject_invalid_values_immediately() {
        assert!(matches!(
            Message::builder().to("123"),
            Err(ValidationError::InvalidPhoneFormat { .. })
        ));
        assert!(matches!(
            Message::builder().to("+34666666666"),
            Err(ValidationError::InvalidPhoneFormat { .. })
        ));
        assert!(matches!(
            Message::builder().from("6666666666666666"),
            Err(ValidationError::InvalidSenderFormat { .. })
        ));
        assert!(matches!(
            Message::builder().text(""),
            Err(ValidationError::MissingMessage)
        ));
        assert!(matches!(
            Message::builder().custom("x".repeat(33)),
            Err(ValidationError::Configuration { .. })
        ));
        assert!(matches!(
            Message::builder().encoding("latin1"),
            Err(ValidationError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn setters_accept_boundary_values() {
        let builder = Message::builder()
            .to("12345678")
            .and_then(|b| b.from("666666666666666"))
            .and_then(|b| b.from("ABCDEFGHIJK"))
            .and_then(|b| b.encoding("ucs2"))
            .and_then(|b| b.custom("c".repeat(32)));
        assert!(builder.is_ok());
    }

    #[test]
    fn validate_reports_every_missing_field() {
        let err = Message::builder().validate().unwrap_err();
        assert_eq!(
            err.errors(),
            [
                "to is required".to_owned(),
                "text is required".to_owned(),
                "from is required".to_owned(),
            ]
        );
    }

    #[test]
    fn build_requires_recipient_and_text_but_not_sender() -> Result<(), ValidationError> {
        let message = Message::builder().to("34666666666")?.text("hello")?.build()?;
        assert_eq!(message.to().as_str(), "34666666666");
        assert!(message.from().is_none());

        let err = Message::builder().text("hello")?.build().unwrap_err();
        assert_eq!(err.errors(), ["to is required".to_owned()]);
        Ok(())
    }

    #[test]
    fn length_is_checked_against_final_encoding() -> Result<(), ValidationError> {
        let text = "a".repeat(300);
        let gsm = Message::builder().to("34666666666")?.text(text.clone())?;
        assert!(gsm.clone().build().is_ok());

        let err = gsm.encoding("UCS2")?.build().unwrap_err();
        assert_eq!(
            err.errors(),
            ["message too long: 300 characters (max 201 for UCS2)".to_owned()]
        );
        Ok(())
    }

    #[test]
    fn segment_count_uses_current_encoding() -> Result<(), ValidationError> {
        let draft = Message::builder().text("a".repeat(100))?;
        assert_eq!(draft.segment_count(), 1);
        let draft = draft.encoding("UCS2")?;
        assert_eq!(draft.segment_count(), 2);
        assert_eq!(Message::builder().segment_count(), 1);
        Ok(())
    }

    #[test]
    fn serialize_omits_unset_fields_and_defaults_send_at() -> Result<(), ValidationError> {
        let message = Message::builder().to("34666666666")?.text("hello")?.build()?;
        assert_eq!(
            message.serialize_at(fixed_time()),
            json!({
                "to": "34666666666",
                "text": "hello",
                "send_at": "2025-01-02 10:30:00",
            })
        );
        assert!(message.serialize().get("send_at").is_some());
        Ok(())
    }

    #[test]
    fn serialize_includes_every_set_field() -> Result<(), ValidationError> {
        let message = Message::builder()
            .to("34666666666")?
            .from("Shop")?
            .text("hello")?
            .link("https://example.com")
            .custom("order-1")?
            .encoding("UCS2")?
            .schedule_at(fixed_time())
            .build()?;
        assert_eq!(
            message.serialize(),
            json!({
                "to": "34666666666",
                "from": "Shop",
                "text": "hello",
                "link": "https://example.com",
                "send_at": "2025-01-02 10:30:00",
                "custom": "order-1",
                "encoding": "UCS2",
            })
        );
        Ok(())
    }

    #[test]
    fn to_spec_preserves_fields() -> Result<(), ValidationError> {
        let message = Message::builder()
            .to("34666666666")?
            .text("hello")?
            .custom("c1")?
            .build()?;
        let spec = message.to_spec();
        assert_eq!(spec.to.as_deref(), Some("34666666666"));
        assert_eq!(spec.custom.as_deref(), Some("c1"));
        assert_eq!(spec.encoding, None);
        Ok(())
    }

    #[test]
    fn far_future_schedule_clamps() -> Result<(), ValidationError> {
        let message = Message::builder()
            .to("34666666666")?
            .text("hello")?
            .schedule_in_minutes(i64::MAX)
            .build()?;
        assert_eq!(
            message.to_spec().send_at,
            Some(SendAt::new(chrono::NaiveDateTime::MAX).to_string())
        );
        Ok(())
    }

    #[test]
    fn whitespace_only_text_is_not_empty() -> Result<(), ValidationError> {
        let message = Message::builder().to("34666666666")?.text("   ")?.build()?;
        assert_eq!(message.text(), "   ");
        Ok(())
    }
}
