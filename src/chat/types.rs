use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Identifier sent with every request so the answer service can keep
/// per-conversation memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new("demo-session")
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of the message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    /// Local notices, e.g. a failed request.
    System,
}

/// A document reference backing an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "source")]
    pub source_path: String,
    pub page: i64,
}

impl Citation {
    pub fn new(source_path: impl Into<String>, page: i64) -> Self {
        Self {
            source_path: source_path.into(),
            page,
        }
    }
}

/// Represents a single transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    pub sources: Vec<Citation>,
    pub intent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            sources: Vec::new(),
            intent: None,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    pub fn assistant(reply: ChatReply) -> Self {
        Self {
            sources: reply.sources,
            intent: reply.intent,
            ..Self::new(MessageRole::Assistant, reply.answer)
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, text)
    }

    pub fn has_sources(&self) -> bool {
        self.role == MessageRole::Assistant && !self.sources.is_empty()
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: SessionId,
    pub message: String,
}

impl ChatRequest {
    pub fn new(session_id: SessionId, message: impl Into<String>) -> Self {
        Self {
            session_id,
            message: message.into(),
        }
    }
}

/// Answer returned by the service. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl ChatReply {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
            intent: None,
        }
    }

    pub fn with_sources(mut self, sources: Vec<Citation>) -> Self {
        self.sources = sources;
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Citation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Citation>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Chat-specific error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("A reply is still pending")]
    ReplyPending,

    #[error("No request is in flight")]
    NoRequestInFlight,
}

impl From<ChatError> for Error {
    fn from(err: ChatError) -> Self {
        Error::Chat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = ChatRequest::new(SessionId::default(), "How many leave days?");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"session_id": "demo-session", "message": "How many leave days?"})
        );
    }

    #[test]
    fn test_reply_with_sources() {
        let reply: ChatReply = serde_json::from_value(json!({
            "answer": "X",
            "intent": "LEAVE_AND_TIME_OFF",
            "sources": [{"source": "C:\\docs\\policy.pdf", "page": 4}]
        }))
        .unwrap();

        assert_eq!(reply.answer, "X");
        assert_eq!(reply.intent.as_deref(), Some("LEAVE_AND_TIME_OFF"));
        assert_eq!(reply.sources, vec![Citation::new("C:\\docs\\policy.pdf", 4)]);
    }

    #[test]
    fn test_reply_tolerates_missing_or_null_sources() {
        let missing: ChatReply = serde_json::from_value(json!({"answer": "Hello"})).unwrap();
        assert!(missing.sources.is_empty());

        let null: ChatReply =
            serde_json::from_value(json!({"answer": "Hello", "sources": null})).unwrap();
        assert!(null.sources.is_empty());
    }

    #[test]
    fn test_reply_without_answer_is_rejected() {
        let result = serde_json::from_value::<ChatReply>(json!({"sources": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_assistant_message_from_reply() {
        let reply = ChatReply::new("Hi").with_sources(vec![Citation::new("a\\b.pdf", 1)]);
        let message = ChatMessage::assistant(reply);

        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.text, "Hi");
        assert!(message.has_sources());
    }

    #[test]
    fn test_user_message_has_no_sources() {
        let message = ChatMessage::user("  hello  ");
        assert_eq!(message.text, "  hello  ");
        assert!(!message.has_sources());
        assert!(message.intent.is_none());
    }

    #[test]
    fn test_chat_error_variants() {
        let error: Error = ChatError::ReplyPending.into();
        assert!(error.to_string().contains("pending"));
    }
}
