//! Error context for enriched error information.

use chrono::{DateTime, Utc};

/// Context information attached to errors for debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Model the request was sent to, if any.
    pub model: Option<String>,

    /// Dialog the request belonged to, if the backend assigned one.
    pub dialog_id: Option<i64>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Optional component/module where the error originated.
    pub component: Option<String>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            model: None,
            dialog_id: None,
            timestamp: Utc::now(),
            component: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_dialog_id(mut self, dialog_id: i64) -> Self {
        self.dialog_id = Some(dialog_id);
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref model) = self.model {
            parts.push(format!("model={}", model));
        }
        if let Some(dialog_id) = self.dialog_id {
            parts.push(format!("dialog_id={}", dialog_id));
        }
        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));
        parts.join(" ")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref model) = self.model {
            write!(f, " model={}", model)?;
        }
        if let Some(dialog_id) = self.dialog_id {
            write!(f, " dialog={}", dialog_id)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder_pattern() {
        let ctx = ErrorContext::new("stream_chat")
            .with_model("gpt-4o")
            .with_dialog_id(7)
            .with_component("controller");

        assert_eq!(ctx.operation, "stream_chat");
        assert_eq!(ctx.model.as_deref(), Some("gpt-4o"));
        assert_eq!(ctx.dialog_id, Some(7));
        assert_eq!(ctx.component.as_deref(), Some("controller"));
    }

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("stream_chat").with_model("m1");
        assert_eq!(ctx.to_string(), "[stream_chat] model=m1");
    }

    #[test]
    fn test_to_log_string() {
        let log = ErrorContext::new("send_chat")
            .with_dialog_id(3)
            .to_log_string();
        assert!(log.contains("operation=send_chat"));
        assert!(log.contains("dialog_id=3"));
        assert!(log.contains("timestamp="));
    }
}
