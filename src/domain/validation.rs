use std::fmt;

use crate::domain::encoding::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingRecipient,
    MissingMessage,
    InvalidPhoneFormat {
        input: String,
    },
    InvalidSenderFormat {
        input: String,
    },
    InvalidEncoding {
        input: String,
    },
    MessageTooLong {
        length: usize,
        max: usize,
        encoding: Encoding,
    },
    Configuration {
        reason: String,
    },
    /// Aggregated failure: every violation found, in the order it was found.
    Failed {
        errors: Vec<String>,
    },
}

impl ValidationError {
    /// Per-item messages carried by [`ValidationError::Failed`]; empty for other variants.
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Failed { errors } => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRecipient => write!(f, "the recipient of the sms message is missing"),
            Self::MissingMessage => write!(f, "the sms message text must not be empty"),
            Self::InvalidPhoneFormat { input } => write!(f, "invalid phone format: '{input}'"),
            Self::InvalidSenderFormat { input } => write!(f, "invalid sender format: '{input}'"),
            Self::InvalidEncoding { input } => {
                write!(f, "invalid encoding: '{input}' (expected GSM7 or UCS2)")
            }
            Self::MessageTooLong {
                length,
                max,
                encoding,
            } => write!(
                f,
                "message too long: {length} characters (max {max} for {encoding})"
            ),
            Self::Configuration { reason } => write!(f, "configuration error: {reason}"),
            Self::Failed { errors } => write!(f, "validation failed: {}", errors.join(", ")),
        }
    }
}

impl std::error::Error for ValidationError {}
