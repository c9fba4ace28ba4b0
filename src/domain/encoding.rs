use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Character encoding used by the gateway to pack message text.
pub enum Encoding {
    /// GSM 03.38 7-bit alphabet.
    #[default]
    Gsm7,
    /// UCS-2 (16-bit) for text outside the GSM alphabet.
    Ucs2,
}

impl Encoding {
    /// Field name used by the gateway (`encoding`).
    pub const FIELD: &'static str = "encoding";

    /// Parse an encoding identifier, ignoring ASCII case and surrounding whitespace.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("GSM7") {
            Ok(Self::Gsm7)
        } else if trimmed.eq_ignore_ascii_case("UCS2") {
            Ok(Self::Ucs2)
        } else {
            Err(ValidationError::InvalidEncoding {
                input: value.to_owned(),
            })
        }
    }

    /// Wire representation (`GSM7` / `UCS2`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gsm7 => "GSM7",
            Self::Ucs2 => "UCS2",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Encoding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Encoding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Character limits for one encoding.
pub struct EncodingLimits {
    /// Max characters that fit in a single, non-concatenated message.
    pub single: usize,
    /// Max characters per segment once a message is concatenated.
    pub per_segment: usize,
    /// Max characters accepted for one concatenated message.
    pub batch_max: usize,
}

/// Static encoding table and segment arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingPolicy;

impl EncodingPolicy {
    pub const GSM7: EncodingLimits = EncodingLimits {
        single: 160,
        per_segment: 153,
        batch_max: 459,
    };

    pub const UCS2: EncodingLimits = EncodingLimits {
        single: 70,
        per_segment: 67,
        batch_max: 201,
    };

    pub fn limits(encoding: Encoding) -> EncodingLimits {
        match encoding {
            Encoding::Gsm7 => Self::GSM7,
            Encoding::Ucs2 => Self::UCS2,
        }
    }

    /// Look up limits by identifier; fails with [`ValidationError::InvalidEncoding`].
    pub fn limits_for(encoding: &str) -> Result<EncodingLimits, ValidationError> {
        Encoding::parse(encoding).map(Self::limits)
    }

    /// Number of segments needed for `length` characters. Always at least 1.
    pub fn segment_count_for_length(length: usize, encoding: Encoding) -> usize {
        let limits = Self::limits(encoding);
        if length <= limits.single {
            1
        } else {
            length.div_ceil(limits.per_segment)
        }
    }

    /// Segment count for `text`, measured in characters (not bytes).
    pub fn segment_count(text: &str, encoding: Encoding) -> usize {
        Self::segment_count_for_length(text.chars().count(), encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gsm7_segment_boundaries() {
        let count = |len| EncodingPolicy::segment_count_for_length(len, Encoding::Gsm7);
        assert_eq!(count(0), 1);
        assert_eq!(count(160), 1);
        assert_eq!(count(161), 2);
        assert_eq!(count(306), 2);
        assert_eq!(count(307), 3);
    }

    #[test]
    fn ucs2_segment_boundaries() {
        let count = |len| EncodingPolicy::segment_count_for_length(len, Encoding::Ucs2);
        assert_eq!(count(70), 1);
        assert_eq!(count(71), 2);
        assert_eq!(count(134), 2);
        assert_eq!(count(135), 3);
    }

    #[test]
    fn segment_count_measures_characters_not_bytes() {
        let text = "ñ".repeat(70);
        assert_eq!(text.len(), 140);
        assert_eq!(EncodingPolicy::segment_count(&text, Encoding::Ucs2), 1);
    }

    #[test]
    fn limits_for_rejects_unknown_encodings() {
        assert_eq!(
            EncodingPolicy::limits_for("ucs2").unwrap(),
            EncodingPolicy::UCS2
        );
        assert_eq!(EncodingPolicy::limits_for("GSM7").unwrap().batch_max, 459);
        assert!(matches!(
            EncodingPolicy::limits_for("UTF8"),
            Err(ValidationError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn encoding_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Encoding::Ucs2).unwrap(), "\"UCS2\"");
        let parsed: Encoding = serde_json::from_str("\"gsm7\"").unwrap();
        assert_eq!(parsed, Encoding::Gsm7);
        assert!(serde_json::from_str::<Encoding>("\"latin1\"").is_err());
    }
}
