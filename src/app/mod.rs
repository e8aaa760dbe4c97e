pub mod config;
pub mod state;

pub use config::{AppConfig, ServiceConfig, SessionConfig, UIConfig};
pub use state::AppState;
