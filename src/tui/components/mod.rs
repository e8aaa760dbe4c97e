pub mod chat_view;
pub mod help_popup;
pub mod input_box;
pub mod status_bar;

use ratatui::{layout::Rect, Frame};
use crate::tui::{Event, Theme};

pub use chat_view::ChatView;
pub use help_popup::HelpPopup;
pub use input_box::InputBox;
pub use status_bar::{ConnectionStatus, KeyHint, StatusBar};

/// Base trait for all TUI components
pub trait Component {
    /// Render the component
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Handle input events; returns true when the event was consumed
    fn handle_event(&mut self, event: &Event) -> bool;

    /// Get component title for debugging
    fn title(&self) -> &str {
        "Component"
    }
}
