pub mod citation;
pub mod conversation;
pub mod service;
pub mod types;

pub use citation::{format_citation, DisplayName, PathSeparator};
pub use conversation::{Conversation, ReplyState, SubmitOutcome};
pub use service::{AnswerService, AnswerServiceConfig, HttpAnswerService};
pub use types::{ChatError, ChatMessage, ChatReply, ChatRequest, Citation, MessageRole, SessionId};
