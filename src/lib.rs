pub mod app;
pub mod chat;
pub mod cli;
pub mod error;
pub mod platform;
pub mod tui;

pub use error::{Error, Result};
