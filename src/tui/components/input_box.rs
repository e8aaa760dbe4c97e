use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};
use unicode_width::UnicodeWidthChar;

use crate::tui::{components::Component, Event, Theme};

/// Single-line question field.
#[derive(Debug, Clone)]
pub struct InputBox {
    input: Input,
    is_focused: bool,
    is_waiting: bool,
    placeholder: String,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
            is_focused: false,
            is_waiting: false,
            placeholder: "Ask a question... (Enter: Send)".to_string(),
        }
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn unfocus(&mut self) {
        self.is_focused = false;
    }

    /// Marks the field while a reply is pending; typing is still allowed.
    pub fn set_waiting(&mut self, waiting: bool) {
        self.is_waiting = waiting;
    }

    pub fn clear(&mut self) {
        self.input.reset();
    }

    pub fn get_content(&self) -> String {
        self.input.value().to_string()
    }

    pub fn set_content(&mut self, content: String) {
        self.input = Input::new(content);
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    /// Visible slice of the text and the cursor column within it, both in
    /// display columns.
    fn visible_window(&self, available_width: usize) -> (String, usize) {
        let cursor_col = self.input.visual_cursor();
        let scroll_cols = if cursor_col >= available_width {
            cursor_col + 1 - available_width
        } else {
            0
        };

        let mut chars = self.input.value().chars().peekable();
        let mut skipped = 0;
        while skipped < scroll_cols {
            match chars.next() {
                Some(ch) => skipped += ch.width().unwrap_or(0),
                None => break,
            }
        }

        let mut visible_text = String::new();
        let mut used = 0;
        while let Some(&ch) = chars.peek() {
            let w = ch.width().unwrap_or(0);
            if used + w > available_width {
                break;
            }
            visible_text.push(ch);
            used += w;
            chars.next();
        }

        (visible_text, cursor_col.saturating_sub(skipped))
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.is_focused {
            theme.accent()
        } else {
            theme.border()
        };

        let title = if self.is_waiting {
            " Message (waiting for reply) "
        } else {
            " Message "
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title);

        if self.is_empty() {
            let content = Line::from(Span::styled(&self.placeholder, theme.secondary()));
            let paragraph = Paragraph::new(content).block(block).style(theme.normal());
            frame.render_widget(paragraph, area);
            if self.is_focused {
                frame.set_cursor(area.x + 1, area.y + 1);
            }
            return;
        }

        let available_width = area.width.saturating_sub(2) as usize;
        let (visible_text, cursor_in_view) = self.visible_window(available_width);

        let paragraph = Paragraph::new(Line::from(visible_text))
            .block(block)
            .style(theme.normal());
        frame.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + cursor_in_view as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor(cursor_x, cursor_y);
            }
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_focused {
            return false;
        }

        match event {
            Event::Key(key) => match key.code {
                KeyCode::Enter => false, // Let parent handle send
                _ => {
                    // Leave control/alt combinations to global hotkeys
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        || key.modifiers.contains(KeyModifiers::ALT)
                    {
                        false
                    } else {
                        self.input.handle_event(&crossterm::event::Event::Key(*key));
                        true
                    }
                }
            },
            _ => false,
        }
    }

    fn title(&self) -> &str {
        "InputBox"
    }
}
