use serde::{Deserialize, Serialize};

use crate::domain::encoding::Encoding;

/// One batch item as supplied by the caller, before validation.
///
/// Every field is optional so that a loosely-typed source (a decoded JSON map,
/// a form) can be validated in one pass with all violations reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl MessageSpec {
    pub fn new(to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: Some(to.into()),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn custom(mut self, custom: impl Into<String>) -> Self {
        self.custom = Some(custom.into());
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn send_at(mut self, send_at: impl Into<String>) -> Self {
        self.send_at = Some(send_at.into());
        self
    }
}

/// A validated batch item with configuration defaults applied.
///
/// `send_at` stays `None` until the request is composed, at which point an
/// unscheduled message is stamped with the current time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
}

impl OutboundMessage {
    /// Link carried by this message, if non-empty.
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref().filter(|link| !link.is_empty())
    }
}

/// Per-call overrides for a send. `None` falls back to configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub concat: Option<bool>,
    pub encoding: Option<Encoding>,
    pub report_url: Option<String>,
    pub fake: Option<bool>,
}
