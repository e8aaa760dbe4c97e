use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::info;
use url::Url;

use crate::chat::{AnswerServiceConfig, PathSeparator, SessionId};
use crate::error::{Error, Result};
use crate::platform::AppPaths;

/// Prefix for environment overrides, e.g. `HRCHAT__SERVICE__BASE_URL`.
pub const ENV_PREFIX: &str = "HRCHAT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub session: SessionConfig,
    pub ui: UIConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Resolved below any path already in `base_url`
    pub chat_path: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    pub theme: String,
    pub show_timestamps: bool,
    pub citation_separator: PathSeparator,
    pub tick_rate_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            chat_path: "/chat".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: SessionId::default().to_string(),
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(), // dark, light
            show_timestamps: true,
            citation_separator: PathSeparator::Backslash,
            tick_rate_ms: 250,
        }
    }
}

impl AppConfig {
    /// Loads the per-user config file, writing a default one first if none
    /// exists yet.
    pub async fn load(paths: &AppPaths) -> Result<Self> {
        let config_file = paths.config_file();

        if !config_file.exists() {
            info!("Config file not found, creating default configuration");
            Self::default().save_to(&config_file).await?;
        }

        Self::load_from(&config_file)
    }

    /// Layers defaults, the TOML file (if present) and `HRCHAT__*`
    /// environment variables, then validates.
    pub fn load_from(config_file: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", config_file);

        let defaults = config::Config::try_from(&Self::default())?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::File::from(config_file)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub async fn save_to(&self, config_file: &Path) -> Result<()> {
        info!("Saving configuration to: {:?}", config_file);

        let config_content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(config::ConfigError::Message(e.to_string())))?;

        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(config_file, config_content).await?;

        info!("Configuration saved successfully");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.service.base_url)
            .map_err(|e| Error::validation(format!("Invalid service base_url {:?}: {}", self.service.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "Service base_url must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.service.chat_path.trim().is_empty() {
            return Err(Error::validation("Service chat_path cannot be empty"));
        }

        if self.service.timeout_seconds == 0 {
            return Err(Error::validation("Service timeout_seconds must be greater than 0"));
        }

        if self.session.id.trim().is_empty() {
            return Err(Error::validation("Session id cannot be empty"));
        }

        if !matches!(self.ui.theme.as_str(), "dark" | "light") {
            return Err(Error::validation(format!("Unknown theme: {}", self.ui.theme)));
        }

        if self.ui.tick_rate_ms < 16 || self.ui.tick_rate_ms > 1000 {
            return Err(Error::validation("Tick rate must be between 16 and 1000 ms"));
        }

        Ok(())
    }

    pub fn session_id(&self) -> SessionId {
        SessionId::new(self.session.id.clone())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms)
    }

    pub fn to_service_config(&self) -> AnswerServiceConfig {
        AnswerServiceConfig {
            base_url: self.service.base_url.clone(),
            chat_path: self.service.chat_path.clone(),
            timeout: Duration::from_secs(self.service.timeout_seconds),
        }
    }
}
