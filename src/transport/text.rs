use serde::Deserialize;

/// Scalar the gateway may send as a JSON string, number, or boolean.
///
/// Ids and error codes are not consistently typed across endpoints, so every
/// scalar is normalized to its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TransportText {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl TransportText {
    pub fn into_string(self) -> String {
        match self {
            Self::String(value) => value,
            Self::Number(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_strings_become_text() {
        let parsed: Vec<TransportText> = serde_json::from_str(r#"["a", 42, true]"#).unwrap();
        let texts = parsed
            .into_iter()
            .map(TransportText::into_string)
            .collect::<Vec<_>>();
        assert_eq!(texts, ["a", "42", "true"]);
    }

    #[test]
    fn objects_are_rejected() {
        assert!(serde_json::from_str::<TransportText>(r#"{"a":1}"#).is_err());
    }
}
