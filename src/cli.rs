use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::app::{AppConfig, AppState};
use crate::chat::{format_citation, Conversation, PathSeparator, SubmitOutcome};
use crate::error::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "hrchat")]
#[command(about = "Terminal chat client for a document-grounded HR answer service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Answer service base URL, e.g. http://127.0.0.1:8000
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Session identifier sent with every question
    #[arg(short, long)]
    pub session: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Path separator used to shorten citation sources (backslash, slash, any)
    #[arg(long, value_parser = parse_separator)]
    pub citation_separator: Option<PathSeparator>,
}

fn parse_separator(value: &str) -> std::result::Result<PathSeparator, String> {
    PathSeparator::parse(value)
        .ok_or_else(|| format!("unknown separator '{}', expected backslash, slash or any", value))
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive chat interface
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }

    /// Command-line flags win over file and environment settings.
    pub fn apply_overrides(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            config.service.base_url = endpoint.clone();
        }
        if let Some(session) = &self.session {
            config.session.id = session.clone();
        }
        if let Some(timeout) = self.timeout {
            config.service.timeout_seconds = timeout;
        }
        if let Some(separator) = self.citation_separator {
            config.ui.citation_separator = separator;
        }
        config.validate()
    }
}

/// Runs one submit cycle and formats the answer with its sources.
pub async fn ask_once(state: &AppState, message: &str) -> Result<String> {
    let mut conversation = Conversation::new();

    let request = match conversation.submit(state.session_id(), message)? {
        SubmitOutcome::Dispatched(request) => request,
        SubmitOutcome::Ignored => return Err(Error::validation("Question cannot be empty")),
    };

    info!("Asking {}", state.answer_service().endpoint());
    let reply = match state.answer_service().ask(request).await {
        Ok(reply) => reply,
        Err(e) => {
            conversation.fail(&e)?;
            return Err(e);
        }
    };

    let names = state.citation_names();
    let mut output = reply.answer.trim_end().to_string();
    if !reply.sources.is_empty() {
        output.push_str("\n\nSources:");
        for citation in &reply.sources {
            output.push_str("\n  - ");
            output.push_str(&format_citation(citation, &names));
        }
    }
    conversation.complete(Ok(reply))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{AnswerService, ChatReply, ChatRequest, Citation};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedService(ChatReply);

    #[async_trait]
    impl AnswerService for FixedService {
        async fn ask(&self, _request: ChatRequest) -> Result<ChatReply> {
            Ok(self.0.clone())
        }

        fn endpoint(&self) -> &str {
            "http://fixed/chat"
        }
    }

    struct DownService;

    #[async_trait]
    impl AnswerService for DownService {
        async fn ask(&self, _request: ChatRequest) -> Result<ChatReply> {
            Err(Error::service(503, "index not loaded"))
        }

        fn endpoint(&self) -> &str {
            "http://down/chat"
        }
    }

    fn state(reply: ChatReply) -> AppState {
        AppState::with_service(AppConfig::default(), Arc::new(FixedService(reply)))
    }

    #[test]
    fn test_default_command_is_chat() {
        let cli = Cli::parse_from(["hrchat"]);
        assert_eq!(cli.command(), Commands::Chat);
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["hrchat", "ask", "how", "many", "days?"]);
        match cli.command() {
            Commands::Ask { message } => assert_eq!(message.join(" "), "how many days?"),
            other => panic!("Expected Ask, got {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "hrchat", "--endpoint", "http://hr.internal:9000", "--session", "kiosk-7", "--timeout", "5",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config).unwrap();

        assert_eq!(config.service.base_url, "http://hr.internal:9000");
        assert_eq!(config.session.id, "kiosk-7");
        assert_eq!(config.service.timeout_seconds, 5);
    }

    #[test]
    fn test_citation_separator_flag() {
        let cli = Cli::parse_from(["hrchat", "--citation-separator", "/"]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.ui.citation_separator, PathSeparator::Slash);

        assert!(Cli::try_parse_from(["hrchat", "--citation-separator", "colon"]).is_err());
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli::parse_from(["hrchat", "--timeout", "0"]);
        let mut config = AppConfig::default();
        assert!(cli.apply_overrides(&mut config).is_err());
    }

    #[tokio::test]
    async fn test_ask_once_formats_sources() {
        let reply = ChatReply::new("You get **20** days.\n")
            .with_sources(vec![Citation::new("C:\\docs\\policy.pdf", 4)]);
        let output = ask_once(&state(reply), "leave?").await.unwrap();
        assert_eq!(output, "You get **20** days.\n\nSources:\n  - policy.pdf — page 4");
    }

    #[tokio::test]
    async fn test_ask_once_without_sources() {
        let output = ask_once(&state(ChatReply::new("Hello")), "hi").await.unwrap();
        assert_eq!(output, "Hello");
    }

    #[tokio::test]
    async fn test_ask_once_rejects_blank_question() {
        let result = ask_once(&state(ChatReply::new("unused")), "  ").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_ask_once_propagates_service_failure() {
        let state = AppState::with_service(AppConfig::default(), Arc::new(DownService));
        let result = ask_once(&state, "leave?").await;
        assert!(matches!(result, Err(Error::Service { status: 503, .. })));
    }
}
