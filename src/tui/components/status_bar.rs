use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::{components::Component, Event, Theme};

pub struct StatusBar {
    status_message: String,
    session_info: String,
    connection_status: ConnectionStatus,
    key_hints: Vec<KeyHint>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Connected,
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyHint {
    pub key: String,
    pub action: String,
}

impl KeyHint {
    pub fn new(key: &str, action: &str) -> Self {
        Self {
            key: key.to_string(),
            action: action.to_string(),
        }
    }
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            status_message: "Ready".to_string(),
            session_info: String::new(),
            connection_status: ConnectionStatus::Idle,
            key_hints: Vec::new(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn status(&self) -> &str {
        &self.status_message
    }

    pub fn set_session_info(&mut self, session_id: &str, endpoint: &str) {
        self.session_info = format!("{} @ {}", session_id, endpoint);
    }

    pub fn set_connection_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status;
    }

    pub fn connection_status(&self) -> &ConnectionStatus {
        &self.connection_status
    }

    pub fn set_key_hints(&mut self, hints: Vec<KeyHint>) {
        self.key_hints = hints;
    }

    fn get_connection_indicator(&self, theme: &Theme) -> (&'static str, Style) {
        match &self.connection_status {
            ConnectionStatus::Idle => ("○", theme.secondary()),
            ConnectionStatus::Connecting => ("◐", theme.warning()),
            ConnectionStatus::Connected => ("●", theme.success()),
            ConnectionStatus::Error(_) => ("●", theme.error()),
        }
    }

    fn connection_label(&self) -> &str {
        match &self.connection_status {
            ConnectionStatus::Idle => "Idle",
            ConnectionStatus::Connecting => "Waiting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Error(_) => "Failed",
        }
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (conn_symbol, conn_style) = self.get_connection_indicator(theme);

        let mut spans = vec![
            Span::styled(conn_symbol, conn_style),
            Span::raw(" "),
            Span::styled(self.connection_label(), theme.secondary()),
            Span::raw(" | "),
            Span::styled(self.status_message.as_str(), theme.text()),
            Span::raw(" | "),
            Span::styled(self.session_info.as_str(), theme.accent()),
        ];

        for hint in &self.key_hints {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(hint.key.as_str(), theme.highlight()));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(hint.action.as_str(), theme.secondary()));
        }

        let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
        frame.render_widget(paragraph, area);
    }

    fn handle_event(&mut self, _event: &Event) -> bool {
        false // Status bar doesn't handle events
    }

    fn title(&self) -> &str {
        "StatusBar"
    }
}
