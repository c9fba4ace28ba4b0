//! Client configuration.
//!
//! Every section has defaults matching the gateway's documented behaviour, so
//! a config file only needs the keys it overrides. [`SmsUpConfig::from_env`]
//! reads the same settings from `SMSUP_*` environment variables.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::domain::{Encoding, MaxMessageLength, SenderLimits, ValidationContext};

/// Default base URL of the gateway API.
pub const DEFAULT_API_URL: &str = "https://api.gateway360.com/api/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SmsUpConfig {
    /// API key from the gateway dashboard. Sends fail with `MissingApiKey` without it.
    pub api_key: Option<String>,
    pub api_url: String,
    /// Ask the gateway to accept requests without delivering them (`fake=1`).
    pub test_mode: bool,
    pub defaults: MessageDefaults,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
    pub validation: ValidationSettings,
    pub retry: RetryPolicy,
}

impl Default for SmsUpConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_owned(),
            test_mode: false,
            defaults: MessageDefaults::default(),
            http: HttpSettings::default(),
            logging: LoggingSettings::default(),
            validation: ValidationSettings::default(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageDefaults {
    /// Sender used for messages that do not set `from`.
    pub from: Option<String>,
    pub concat: bool,
    pub encoding: Encoding,
    pub report_url: Option<String>,
}

impl Default for MessageDefaults {
    fn default() -> Self {
        Self {
            from: None,
            concat: true,
            encoding: Encoding::Gsm7,
            report_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Timeouts forwarded to the HTTP transport.
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl HttpSettings {
    pub fn timeout(self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "info" | "notice" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" | "critical" | "alert" | "emergency" => Self::Error,
            _ => return None,
        })
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown log level '{raw}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub enabled: bool,
    /// Recorded as the `channel` field on every log event.
    pub channel: String,
    /// Level used for successful sends; failures always log at `error`.
    pub level: LogLevel,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            channel: "default".to_owned(),
            level: LogLevel::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub validate_phone_format: bool,
    pub max_message_length: MaxMessageLength,
    pub max_custom_length: usize,
    pub max_from_length: SenderLimits,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            validate_phone_format: true,
            max_message_length: MaxMessageLength::default(),
            max_custom_length: 32,
            max_from_length: SenderLimits::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Retry preferences. The client never retries on its own; callers read these
/// through `SmsUpClient::retry_policy`.
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl RetryPolicy {
    pub fn delay(self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

impl SmsUpConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Load configuration from `SMSUP_*` environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`SmsUpConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let text = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let flag = |key: &str| text(key).and_then(|value| parse_bool(&value));
        let number = |key: &str| text(key).and_then(|value| value.trim().parse::<u64>().ok());

        config.api_key = text("SMSUP_API_KEY");
        if let Some(api_url) = text("SMSUP_API_URL") {
            config.api_url = api_url;
        }
        if let Some(test_mode) = flag("SMSUP_TEST_MODE") {
            config.test_mode = test_mode;
        }

        config.defaults.from = text("SMSUP_DEFAULT_FROM");
        if let Some(concat) = flag("SMSUP_CONCAT") {
            config.defaults.concat = concat;
        }
        if let Some(encoding) = text("SMSUP_ENCODING").and_then(|v| Encoding::parse(&v).ok()) {
            config.defaults.encoding = encoding;
        }
        config.defaults.report_url = text("SMSUP_REPORT_URL");

        if let Some(timeout) = number("SMSUP_HTTP_TIMEOUT") {
            config.http.timeout_secs = timeout;
        }
        if let Some(timeout) = number("SMSUP_HTTP_CONNECT_TIMEOUT") {
            config.http.connect_timeout_secs = timeout;
        }

        if let Some(enabled) = flag("SMSUP_LOGGING") {
            config.logging.enabled = enabled;
        }
        if let Some(channel) = text("SMSUP_LOG_CHANNEL") {
            config.logging.channel = channel;
        }
        if let Some(level) = text("SMSUP_LOG_LEVEL").and_then(|v| LogLevel::parse(&v)) {
            config.logging.level = level;
        }

        if let Some(validate) = flag("SMSUP_VALIDATE_PHONE") {
            config.validation.validate_phone_format = validate;
        }

        if let Some(enabled) = flag("SMSUP_RETRY_ENABLED") {
            config.retry.enabled = enabled;
        }
        if let Some(attempts) = number("SMSUP_RETRY_MAX_ATTEMPTS") {
            config.retry.max_attempts = u32::try_from(attempts).unwrap_or(u32::MAX);
        }
        if let Some(delay) = number("SMSUP_RETRY_DELAY") {
            config.retry.delay_ms = delay;
        }

        config
    }

    /// Snapshot of the settings batch validation depends on.
    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext {
            default_from: self.defaults.from.clone(),
            default_encoding: self.defaults.encoding,
            validate_phone_format: self.validation.validate_phone_format,
            max_custom_length: self.validation.max_custom_length,
            max_message_length: self.validation.max_message_length,
            sender_limits: self.validation.max_from_length,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_gateway_documentation() {
        let config = SmsUpConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!config.test_mode);
        assert!(config.defaults.concat);
        assert_eq!(config.defaults.encoding, Encoding::Gsm7);
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
        assert_eq!(config.http.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.validation.max_message_length.gsm7, 459);
        assert_eq!(config.validation.max_message_length.ucs2, 201);
        assert_eq!(config.validation.max_custom_length, 32);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay(), Duration::from_millis(1000));
    }

    #[test]
    fn from_lookup_reads_smsup_variables() {
        let config = SmsUpConfig::from_lookup(lookup(&[
            ("SMSUP_API_KEY", "key"),
            ("SMSUP_TEST_MODE", "true"),
            ("SMSUP_DEFAULT_FROM", "Shop"),
            ("SMSUP_CONCAT", "0"),
            ("SMSUP_ENCODING", "ucs2"),
            ("SMSUP_HTTP_TIMEOUT", "5"),
            ("SMSUP_LOGGING", "off"),
            ("SMSUP_LOG_LEVEL", "warning"),
            ("SMSUP_VALIDATE_PHONE", "no"),
            ("SMSUP_RETRY_MAX_ATTEMPTS", "7"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert!(config.test_mode);
        assert_eq!(config.defaults.from.as_deref(), Some("Shop"));
        assert!(!config.defaults.concat);
        assert_eq!(config.defaults.encoding, Encoding::Ucs2);
        assert_eq!(config.http.timeout_secs, 5);
        assert!(!config.logging.enabled);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(!config.validation.validate_phone_format);
        assert_eq!(config.retry.max_attempts, 7);
    }

    #[test]
    fn from_lookup_keeps_defaults_for_blank_or_bad_values() {
        let config = SmsUpConfig::from_lookup(lookup(&[
            ("SMSUP_API_KEY", "   "),
            ("SMSUP_TEST_MODE", "maybe"),
            ("SMSUP_HTTP_TIMEOUT", "soon"),
            ("SMSUP_ENCODING", "latin1"),
        ]));
        assert_eq!(config, SmsUpConfig::default());
    }

    #[test]
    fn deserializes_partial_json() {
        let config: SmsUpConfig = serde_json::from_str(
            r#"{
                "api_key": "key",
                "defaults": { "from": "Shop", "encoding": "UCS2" },
                "validation": { "max_message_length": { "GSM7": 300 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.defaults.encoding, Encoding::Ucs2);
        assert!(config.defaults.concat);
        assert_eq!(config.validation.max_message_length.gsm7, 300);
        assert_eq!(config.validation.max_message_length.ucs2, 201);
        assert_eq!(config.logging.channel, "default");

        let context = config.validation_context();
        assert_eq!(context.default_from.as_deref(), Some("Shop"));
        assert_eq!(context.default_encoding, Encoding::Ucs2);
    }

    #[test]
    fn log_level_aliases_deserialize_like_env_values() {
        let config: SmsUpConfig =
            serde_json::from_str(r#"{ "logging": { "level": "warning" } }"#).unwrap();
        assert_eq!(config.logging.level, LogLevel::Warn);

        let config: SmsUpConfig =
            serde_json::from_str(r#"{ "logging": { "level": "Critical" } }"#).unwrap();
        assert_eq!(config.logging.level, LogLevel::Error);

        assert!(serde_json::from_str::<SmsUpConfig>(r#"{ "logging": { "level": "loud" } }"#).is_err());
    }
}
