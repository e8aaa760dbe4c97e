use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

use crate::tui::{components::Component, Event, Theme};

pub struct HelpPopup {
    is_visible: bool,
}

impl HelpPopup {
    pub fn new() -> Self {
        Self {
            is_visible: false,
        }
    }

    pub fn show(&mut self) {
        self.is_visible = true;
    }

    pub fn hide(&mut self) {
        self.is_visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn toggle(&mut self) {
        self.is_visible = !self.is_visible;
    }

    fn get_help_content() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Chat", ""),
            ("  Enter", "Send question"),
            ("  Ctrl+U", "Clear the input field"),
            ("", ""),
            ("Navigation", ""),
            ("  Tab / Shift+Tab", "Switch between transcript and input"),
            ("  Arrow keys / jk", "Scroll the transcript"),
            ("  Page Up/Down", "Scroll quickly"),
            ("  Home/End (g/G)", "Go to top/bottom of the transcript"),
            ("  Mouse wheel", "Scroll the transcript"),
            ("", ""),
            ("General", ""),
            ("  F1 / Ctrl+/", "Show/hide this help"),
            ("  Ctrl+C / Ctrl+Q", "Quit (cancels a pending request)"),
        ]
    }

    /// Fixed-size box centred in `area`, shrunk to fit small terminals.
    fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HelpPopup {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.is_visible {
            return;
        }

        let help_content = Self::get_help_content();
        let key_width = help_content.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        let popup_area = Self::centered_rect(64, help_content.len() as u16 + 2, area);

        // Clear the area
        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = help_content
            .iter()
            .map(|(key, description)| {
                if key.is_empty() {
                    ListItem::new(Line::from(""))
                } else if description.is_empty() {
                    // Section header
                    ListItem::new(Line::from(Span::styled(
                        *key,
                        theme.accent().add_modifier(Modifier::BOLD),
                    )))
                } else {
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{:<width$}", key, width = key_width), theme.highlight()),
                        Span::raw("  "),
                        Span::styled(*description, theme.text()),
                    ]))
                }
            })
            .collect();

        let help_list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.accent())
                    .title(" Keys (F1 or Esc to close) "),
            )
            .style(theme.normal());

        frame.render_widget(help_list, popup_area);
    }

    /// Swallows keys while visible; ticks and replies always pass through.
    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_visible {
            return false;
        }

        match event {
            Event::Key(key) => {
                match (key.code, key.modifiers) {
                    (KeyCode::Esc, _) | (KeyCode::F(1), _) | (KeyCode::Char('q'), _) => {
                        self.hide();
                        true
                    }
                    (KeyCode::Char('/'), KeyModifiers::CONTROL) => {
                        self.hide();
                        true
                    }
                    _ => true,
                }
            }
            _ => false,
        }
    }

    fn title(&self) -> &str {
        "HelpPopup"
    }
}
