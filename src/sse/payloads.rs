//! Serde shapes for the JSON carried on `data:` lines.

use serde::Deserialize;

/// Body of a chat stream event: `{content, done, error?}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatPayload {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<ErrorField>,
}

/// Error descriptor. The backend sends `{"msg": ...}`; a bare string is
/// accepted as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorField {
    Detailed {
        #[serde(alias = "message")]
        msg: String,
    },
    Text(String),
}

impl ErrorField {
    pub fn into_message(self) -> String {
        match self {
            ErrorField::Detailed { msg } => msg,
            ErrorField::Text(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_payload() {
        let payload: ChatPayload =
            serde_json::from_str(r#"{"content":"hi","done":false}"#).unwrap();
        assert_eq!(payload.content.as_deref(), Some("hi"));
        assert!(!payload.done);
        assert!(payload.error.is_none());
    }

    #[test]
    fn test_error_only_payload() {
        let payload: ChatPayload =
            serde_json::from_str(r#"{"error":{"msg":"rate limited"}}"#).unwrap();
        assert!(payload.content.is_none());
        assert_eq!(payload.error.unwrap().into_message(), "rate limited");
    }

    #[test]
    fn test_error_field_variants() {
        let alias: ErrorField = serde_json::from_str(r#"{"message":"x"}"#).unwrap();
        assert_eq!(alias.into_message(), "x");
        let text: ErrorField = serde_json::from_str(r#""plain""#).unwrap();
        assert_eq!(text.into_message(), "plain");
    }
}
