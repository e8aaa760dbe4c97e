use std::sync::Arc;
use tracing::{debug, info};

use crate::app::config::AppConfig;
use crate::chat::{AnswerService, HttpAnswerService, PathSeparator, SessionId};
use crate::error::Result;

/// Process-wide state shared by the TUI and the one-shot command.
pub struct AppState {
    config: AppConfig,
    session_id: SessionId,
    answer_service: Arc<dyn AnswerService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing application state");

        config.validate()?;
        let service = HttpAnswerService::new(&config.to_service_config())?;

        Ok(Self::with_service(config, Arc::new(service)))
    }

    pub fn with_service(config: AppConfig, answer_service: Arc<dyn AnswerService>) -> Self {
        let session_id = config.session_id();
        debug!("Session id: {}", session_id);

        Self {
            config,
            session_id,
            answer_service,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fixed for the lifetime of the process.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn answer_service(&self) -> Arc<dyn AnswerService> {
        Arc::clone(&self.answer_service)
    }

    pub fn citation_names(&self) -> PathSeparator {
        self.config.ui.citation_separator
    }
}
