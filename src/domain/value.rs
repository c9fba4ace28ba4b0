use std::fmt;

use chrono::{Local, NaiveDateTime, TimeDelta};
use phonenumber::country;
use serde::Deserialize;

use crate::domain::validation::ValidationError;

/// Shortest accepted destination number (digits).
pub const PHONE_MIN_DIGITS: usize = 8;
/// Longest accepted destination number (digits).
pub const PHONE_MAX_DIGITS: usize = 15;

/// Returns `true` for 8–15 ASCII digits with no prefix or separators.
pub fn is_valid_phone_format(value: &str) -> bool {
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&value.len())
        && value.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Maximum sender id lengths, by sender kind.
pub struct SenderLimits {
    pub numeric: usize,
    pub alphanumeric: usize,
}

impl Default for SenderLimits {
    fn default() -> Self {
        Self {
            numeric: 15,
            alphanumeric: 11,
        }
    }
}

/// Numeric senders may be up to `limits.numeric` digits; anything else must be
/// letters, digits and spaces up to `limits.alphanumeric` characters.
pub fn is_valid_sender_format(value: &str, limits: SenderLimits) -> bool {
    if value.is_empty() {
        return false;
    }
    let length = value.chars().count();
    if value.bytes().all(|b| b.is_ascii_digit()) {
        return length <= limits.numeric;
    }
    length <= limits.alphanumeric && value.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ')
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Gateway `api_key`.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    /// JSON field name used by the gateway (`api_key`).
    pub const FIELD: &'static str = "api_key";

    /// Returns `None` when the value is blank.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Destination number (`to`).
///
/// Invariant: 8–15 ASCII digits, no leading `+`.
pub struct Recipient(String);

impl Recipient {
    /// JSON field name used by the gateway (`to`).
    pub const FIELD: &'static str = "to";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if !is_valid_phone_format(&value) {
            return Err(ValidationError::InvalidPhoneFormat { input: value });
        }
        Ok(Self(value))
    }

    /// Parse a human-formatted number (`+34 666 66 66 66`, `666666666` with a
    /// default region) and normalize it to the digits-only E.164 form.
    pub fn from_international(
        default_region: Option<country::Id>,
        input: &str,
    ) -> Result<Self, ValidationError> {
        let raw = input.trim();
        let parsed = phonenumber::parse(default_region, raw).map_err(|_| {
            ValidationError::InvalidPhoneFormat {
                input: raw.to_owned(),
            }
        })?;
        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();
        Self::new(e164.trim_start_matches('+'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender id (`from`).
///
/// Invariant: numeric of at most 15 digits, or letters/digits/spaces of at most 11 characters.
pub struct SenderId(String);

impl SenderId {
    /// JSON field name used by the gateway (`from`).
    pub const FIELD: &'static str = "from";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_limits(value, SenderLimits::default())
    }

    /// Validate against custom length limits.
    pub fn with_limits(
        value: impl Into<String>,
        limits: SenderLimits,
    ) -> Result<Self, ValidationError> {
        let value = value.into();
        if !is_valid_sender_format(&value, limits) {
            return Err(ValidationError::InvalidSenderFormat { input: value });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Opaque correlation tag echoed back by the gateway (`custom`).
///
/// Invariant: at most [`CustomTag::MAX_LENGTH`] characters.
pub struct CustomTag(String);

impl CustomTag {
    /// JSON field name used by the gateway (`custom`).
    pub const FIELD: &'static str = "custom";

    pub const MAX_LENGTH: usize = 32;

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let length = value.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ValidationError::Configuration {
                reason: format!(
                    "custom field is too long: {length} characters (max {})",
                    Self::MAX_LENGTH
                ),
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Scheduled send time in gateway-local time (`send_at`).
pub struct SendAt(NaiveDateTime);

impl SendAt {
    /// JSON field name used by the gateway (`send_at`).
    pub const FIELD: &'static str = "send_at";

    /// Wire format: `YYYY-MM-DD HH:MM:SS`.
    pub const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    pub fn new(value: NaiveDateTime) -> Self {
        Self(value)
    }

    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// Offsets beyond chrono's range clamp to `NaiveDateTime::MAX` / `MIN`.
    pub fn in_minutes(minutes: i64) -> Self {
        Self::shifted(TimeDelta::try_minutes(minutes), minutes >= 0)
    }

    /// Clamps like [`SendAt::in_minutes`].
    pub fn in_hours(hours: i64) -> Self {
        Self::shifted(TimeDelta::try_hours(hours), hours >= 0)
    }

    fn shifted(delta: Option<TimeDelta>, forward: bool) -> Self {
        let now = Local::now().naive_local();
        let bound = if forward {
            NaiveDateTime::MAX
        } else {
            NaiveDateTime::MIN
        };
        Self(
            delta
                .and_then(|delta| now.checked_add_signed(delta))
                .unwrap_or(bound),
        )
    }

    /// Parse a `YYYY-MM-DD HH:MM:SS` timestamp.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        NaiveDateTime::parse_from_str(value.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|err| ValidationError::Configuration {
                reason: format!("invalid send_at timestamp '{value}': {err}"),
            })
    }

    pub fn value(self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for SendAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn phone_format_accepts_only_8_to_15_digits() {
        assert!(is_valid_phone_format("12345678"));
        assert!(is_valid_phone_format("34666666666"));
        assert!(is_valid_phone_format("123456789012345"));
        assert!(!is_valid_phone_format("1234567"));
        assert!(!is_valid_phone_format("1234567890123456"));
        assert!(!is_valid_phone_format("123"));
        assert!(!is_valid_phone_format("+34666666666"));
        assert!(!is_valid_phone_format("34666666666x"));
        assert!(!is_valid_phone_format("3466 666 666"));
        assert!(!is_valid_phone_format("３４６６６６６６６"));
    }

    #[test]
    fn sender_format_distinguishes_numeric_and_alphanumeric() {
        let limits = SenderLimits::default();
        assert!(is_valid_sender_format("666666666666666", limits));
        assert!(!is_valid_sender_format("6666666666666666", limits));
        assert!(is_valid_sender_format("Company 123", limits));
        assert!(!is_valid_sender_format("Company 1234", limits));
        assert!(!is_valid_sender_format("Shop-Online", limits));
        assert!(!is_valid_sender_format("", limits));
    }

    #[test]
    fn sender_limits_are_configurable() {
        let limits = SenderLimits {
            numeric: 5,
            alphanumeric: 3,
        };
        assert!(SenderId::with_limits("12345", limits).is_ok());
        assert!(SenderId::with_limits("123456", limits).is_err());
        assert!(SenderId::with_limits("ABCD", limits).is_err());
    }

    #[test]
    fn api_key_is_trimmed_and_redacted() {
        let key = ApiKey::new("  secret ").unwrap();
        assert_eq!(key.as_str(), "secret");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
        assert!(ApiKey::new("   ").is_none());
    }

    #[test]
    fn recipient_from_international_strips_plus_and_separators() {
        let recipient = Recipient::from_international(None, "+34 666 66 66 66").unwrap();
        assert_eq!(recipient.as_str(), "34666666666");

        let recipient =
            Recipient::from_international(Some(country::Id::ES), "666 666 666").unwrap();
        assert_eq!(recipient.as_str(), "34666666666");

        assert!(Recipient::from_international(None, "not-a-number").is_err());
    }

    #[test]
    fn custom_tag_length_is_enforced() {
        assert!(CustomTag::new("a".repeat(32)).is_ok());
        assert!(matches!(
            CustomTag::new("a".repeat(33)),
            Err(ValidationError::Configuration { .. })
        ));
    }

    #[test]
    fn send_at_formats_and_parses_wire_timestamps() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        let send_at = SendAt::new(at);
        assert_eq!(send_at.to_string(), "2024-03-09 07:05:00");
        assert_eq!(SendAt::parse("2024-03-09 07:05:00").unwrap(), send_at);
        assert!(SendAt::parse("09/03/2024").is_err());
    }

    #[test]
    fn send_at_offsets_are_relative_to_now() {
        let before = SendAt::now();
        let later = SendAt::in_hours(2);
        let soon = SendAt::in_minutes(5);
        assert!(soon > before);
        assert!(later > soon);
    }

    #[test]
    fn send_at_offsets_out_of_range_clamp_instead_of_overflowing() {
        assert_eq!(SendAt::in_minutes(1_000_000_000_000).value(), NaiveDateTime::MAX);
        assert_eq!(SendAt::in_hours(i64::MAX / 3600 / 1000).value(), NaiveDateTime::MAX);
        assert_eq!(SendAt::in_minutes(i64::MAX).value(), NaiveDateTime::MAX);
        assert_eq!(SendAt::in_hours(i64::MIN).value(), NaiveDateTime::MIN);
    }
}
