//! Transcript and awaiting-reply latch for a single conversation.
//!
//! [`Conversation`] drives one request/response cycle per submission: the
//! user message is appended and a [`ChatRequest`] is handed back to the caller
//! to dispatch; the reply (or failure) is fed back through
//! [`Conversation::complete`]. At most one request is in flight.

use tracing::{debug, warn};

use crate::chat::types::{ChatError, ChatMessage, ChatReply, ChatRequest, SessionId};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyState {
    #[default]
    Idle,
    Waiting,
}

/// Result of [`Conversation::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// The user message was appended; the request must be sent.
    Dispatched(ChatRequest),
}

#[derive(Debug, Default)]
pub struct Conversation {
    transcript: Vec<ChatMessage>,
    reply_state: ReplyState,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    pub fn reply_state(&self) -> ReplyState {
        self.reply_state
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.reply_state == ReplyState::Waiting
    }

    /// Appends the user message and latches into [`ReplyState::Waiting`].
    ///
    /// The stored text is the raw input; only the emptiness check trims.
    pub fn submit(
        &mut self,
        session_id: &SessionId,
        pending_text: &str,
    ) -> Result<SubmitOutcome, ChatError> {
        if pending_text.trim().is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }
        if self.is_awaiting_reply() {
            debug!("Rejecting submission while a reply is pending");
            return Err(ChatError::ReplyPending);
        }

        self.transcript.push(ChatMessage::user(pending_text));
        self.reply_state = ReplyState::Waiting;

        Ok(SubmitOutcome::Dispatched(ChatRequest::new(
            session_id.clone(),
            pending_text,
        )))
    }

    /// Releases the latch and appends the assistant reply, or an error notice
    /// when the request failed.
    pub fn complete(
        &mut self,
        outcome: Result<ChatReply, String>,
    ) -> Result<&ChatMessage, ChatError> {
        if !self.is_awaiting_reply() {
            return Err(ChatError::NoRequestInFlight);
        }
        self.reply_state = ReplyState::Idle;

        let message = match outcome {
            Ok(reply) => ChatMessage::assistant(reply),
            Err(reason) => {
                warn!("Answer request failed: {}", reason);
                ChatMessage::system(reason)
            }
        };
        self.transcript.push(message);

        Ok(&self.transcript[self.transcript.len() - 1])
    }

    /// Convenience for callers holding a crate [`Error`].
    pub fn fail(&mut self, error: &Error) -> Result<&ChatMessage, ChatError> {
        self.complete(Err(error.user_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::types::{Citation, MessageRole};

    fn session() -> SessionId {
        SessionId::default()
    }

    #[test]
    fn test_successful_cycle_appends_two_messages() {
        let mut conversation = Conversation::new();

        let outcome = conversation.submit(&session(), "What is the leave policy?").unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Dispatched(ChatRequest::new(session(), "What is the leave policy?"))
        );
        assert_eq!(conversation.len(), 1);
        assert!(conversation.is_awaiting_reply());

        let reply = ChatReply::new("20 days").with_sources(vec![Citation::new("C:\\p.pdf", 2)]);
        let message = conversation.complete(Ok(reply)).unwrap();
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.text, "20 days");

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.reply_state(), ReplyState::Idle);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut conversation = Conversation::new();

        for input in ["", "   ", "\n\t "] {
            assert_eq!(conversation.submit(&session(), input), Ok(SubmitOutcome::Ignored));
        }
        assert!(conversation.is_empty());
        assert_eq!(conversation.reply_state(), ReplyState::Idle);
    }

    #[test]
    fn test_raw_text_is_kept() {
        let mut conversation = Conversation::new();
        conversation.submit(&session(), "  padded  ").unwrap();
        assert_eq!(conversation.transcript()[0].text, "  padded  ");
    }

    #[test]
    fn test_submit_while_waiting_is_rejected() {
        let mut conversation = Conversation::new();
        conversation.submit(&session(), "first").unwrap();

        let result = conversation.submit(&session(), "second");
        assert_eq!(result, Err(ChatError::ReplyPending));
        assert_eq!(conversation.len(), 1);
        assert!(conversation.is_awaiting_reply());
    }

    #[test]
    fn test_blank_input_while_waiting_is_still_ignored() {
        let mut conversation = Conversation::new();
        conversation.submit(&session(), "first").unwrap();
        assert_eq!(conversation.submit(&session(), " "), Ok(SubmitOutcome::Ignored));
    }

    #[test]
    fn test_failure_appends_system_notice_and_keeps_user_message() {
        let mut conversation = Conversation::new();
        conversation.submit(&session(), "hello").unwrap();

        let message = conversation
            .complete(Err("Could not reach the answer service.".to_string()))
            .unwrap();
        assert_eq!(message.role, MessageRole::System);

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.transcript()[0].role, MessageRole::User);
        assert!(!conversation.is_awaiting_reply());

        // The latch is released, so the next submission goes through
        assert!(matches!(
            conversation.submit(&session(), "again"),
            Ok(SubmitOutcome::Dispatched(_))
        ));
    }

    #[test]
    fn test_fail_uses_user_facing_text() {
        let mut conversation = Conversation::new();
        conversation.submit(&session(), "hello").unwrap();

        let message = conversation.fail(&Error::service(500, "boom")).unwrap();
        assert_eq!(message.text, "The answer service failed with status 500.");
    }

    #[test]
    fn test_complete_without_request_is_rejected() {
        let mut conversation = Conversation::new();
        let result = conversation.complete(Ok(ChatReply::new("stray")));
        assert_eq!(result.unwrap_err(), ChatError::NoRequestInFlight);
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_session_id_is_carried_into_request() {
        let mut conversation = Conversation::new();
        let custom = SessionId::new("kiosk-7");
        match conversation.submit(&custom, "hi").unwrap() {
            SubmitOutcome::Dispatched(request) => assert_eq!(request.session_id, custom),
            other => panic!("Expected dispatch, got {:?}", other),
        }
    }
}
