use serde::{Deserialize, Serialize};
use std::fmt;

use super::message::{HistoryEntry, MessageRole};
use crate::traits::Params;

/// Whether the backend sees only the new prompt or the prior turns as well
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogMode {
    /// Just the prompt
    #[default]
    Single,
    /// Prompt plus history, sent as a JSON array
    Multi,
}

impl DialogMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogMode::Single => "single",
            DialogMode::Multi => "multi",
        }
    }
}

/// Caller credentials, sent as `user` / `password` on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Read `CYF_USER` / `CYF_PASSWORD`. Missing variables become empty strings.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("CYF_USER").unwrap_or_default(),
            std::env::var("CYF_PASSWORD").unwrap_or_default(),
        )
    }

    /// Query parameters carrying the credentials. Empty values are omitted.
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        if !self.user.is_empty() {
            params.push(("user".to_string(), self.user.clone()));
        }
        if !self.password.is_empty() {
            params.push(("password".to_string(), self.password.clone()));
        }
        params
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One chat completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// The new user prompt
    pub prompt: String,
    /// Single or multi-turn
    pub mode: DialogMode,
    /// Prior turns, oldest first (only sent in multi mode)
    pub history: Vec<HistoryEntry>,
    /// Optional dialog title
    pub title: Option<String>,
}

impl ChatRequest {
    /// A single-turn request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            mode: DialogMode::Single,
            history: Vec::new(),
            title: None,
        }
    }

    /// A multi-turn request carrying `history`
    pub fn multi(
        model: impl Into<String>,
        prompt: impl Into<String>,
        history: Vec<HistoryEntry>,
    ) -> Self {
        Self {
            mode: DialogMode::Multi,
            history,
            ..Self::new(model, prompt)
        }
    }

    /// Set the dialog title (builder pattern)
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Value of the `dialog` field.
    ///
    /// Single mode sends the prompt as is. Multi mode sends the JSON array of
    /// the history followed by the new user turn.
    pub fn dialog_field(&self) -> Result<String, serde_json::Error> {
        match self.mode {
            DialogMode::Single => Ok(self.prompt.clone()),
            DialogMode::Multi => {
                let mut turns = self.history.clone();
                turns.push(HistoryEntry::new(MessageRole::User, self.prompt.clone()));
                serde_json::to_string(&turns)
            }
        }
    }

    /// Encode the request as query or form fields (without credentials).
    pub fn to_params(&self) -> Result<Params, serde_json::Error> {
        let mut params = vec![
            ("model".to_string(), self.model.clone()),
            ("dialog".to_string(), self.dialog_field()?),
        ];
        if self.mode == DialogMode::Multi {
            params.push(("dialog_mode".to_string(), self.mode.as_str().to_string()));
        }
        if let Some(ref title) = self.title {
            params.push(("title".to_string(), title.clone()));
        }
        Ok(params)
    }

    /// Full query string for a streaming request: request fields followed by
    /// the credentials.
    pub fn to_query(&self, credentials: &Credentials) -> Result<Params, serde_json::Error> {
        let mut query = self.to_params()?;
        query.extend(credentials.to_params());
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_single_mode_params() {
        let params = ChatRequest::new("gpt-4o", "hello").to_params().unwrap();
        assert_eq!(value(&params, "model"), Some("gpt-4o"));
        assert_eq!(value(&params, "dialog"), Some("hello"));
        assert_eq!(value(&params, "dialog_mode"), None);
        assert_eq!(value(&params, "title"), None);
    }

    #[test]
    fn test_multi_mode_params() {
        let history = vec![
            HistoryEntry::new(MessageRole::User, "hi"),
            HistoryEntry::new(MessageRole::Assistant, "hello!"),
        ];
        let request = ChatRequest::multi("m", "how are you", history).with_title("Greeting");
        let params = request.to_params().unwrap();

        assert_eq!(value(&params, "dialog_mode"), Some("multi"));
        assert_eq!(value(&params, "title"), Some("Greeting"));

        let dialog: Vec<HistoryEntry> =
            serde_json::from_str(value(&params, "dialog").unwrap()).unwrap();
        assert_eq!(dialog.len(), 3);
        assert_eq!(dialog[2], HistoryEntry::new(MessageRole::User, "how are you"));
    }

    #[test]
    fn test_multi_mode_without_history() {
        let request = ChatRequest::multi("m", "first", Vec::new());
        assert_eq!(
            request.dialog_field().unwrap(),
            r#"[{"role":"user","content":"first"}]"#
        );
    }

    #[test]
    fn test_to_query_appends_credentials() {
        let query = ChatRequest::new("m", "hi")
            .to_query(&Credentials::new("bob", "pw"))
            .unwrap();
        let keys: Vec<&str> = query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["model", "dialog", "user", "password"]);
    }

    #[test]
    fn test_credentials_params() {
        let creds = Credentials::new("alice", "secret1");
        assert_eq!(
            creds.to_params(),
            vec![
                ("user".to_string(), "alice".to_string()),
                ("password".to_string(), "secret1".to_string()),
            ]
        );
        assert!(Credentials::new("", "").to_params().is_empty());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("alice", "hunter22"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_dialog_mode_default() {
        assert_eq!(DialogMode::default(), DialogMode::Single);
        assert_eq!(DialogMode::Multi.as_str(), "multi");
    }
}
