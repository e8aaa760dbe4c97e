use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Answer service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Chat error: {0}")]
    Chat(String),
}

impl Error {
    pub fn platform(msg: impl Into<String>) -> Self {
        Error::Platform(msg.into())
    }

    pub fn service(status: u16, body: impl Into<String>) -> Self {
        Error::Service {
            status,
            body: body.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Short text suitable for an inline error bubble.
    pub fn user_message(&self) -> String {
        match self {
            Error::Http(e) if e.is_timeout() => "The answer service did not respond in time.".to_string(),
            Error::Http(e) if e.is_connect() => "Could not reach the answer service.".to_string(),
            Error::Http(e) if e.is_decode() => "The answer service sent a response that could not be read.".to_string(),
            Error::Service { status, .. } => format!("The answer service failed with status {}.", status),
            Error::Json(_) => "The answer service sent a response that could not be read.".to_string(),
            other => other.to_string(),
        }
    }
}
