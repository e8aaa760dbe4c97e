use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info};

use crate::app::AppState;
use crate::chat::{ChatError, ChatReply, ChatRequest, SubmitOutcome};
use crate::tui::{
    components::{ChatView, Component, ConnectionStatus, HelpPopup, InputBox, KeyHint, StatusBar},
    Event, Theme,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusedPanel {
    ChatView,
    InputBox,
}

pub struct App {
    // Components
    chat_view: ChatView,
    input_box: InputBox,
    status_bar: StatusBar,
    help_popup: HelpPopup,

    // State
    focused_panel: FocusedPanel,
    theme: Theme,
    should_quit: bool,

    // Backend integration
    app_state: Arc<AppState>,
    event_sender: mpsc::UnboundedSender<Event>,
    in_flight: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(app_state: Arc<AppState>, event_sender: mpsc::UnboundedSender<Event>) -> Self {
        let config = app_state.config().clone();

        let chat_view = ChatView::new("HR Chatbot", config.ui.citation_separator)
            .with_timestamps(config.ui.show_timestamps);

        let mut status_bar = StatusBar::new();
        status_bar.set_session_info(
            app_state.session_id().as_str(),
            app_state.answer_service().endpoint(),
        );

        let mut app = Self {
            chat_view,
            input_box: InputBox::new(),
            status_bar,
            help_popup: HelpPopup::new(),
            focused_panel: FocusedPanel::InputBox,
            theme: Theme::by_name(&config.ui.theme),
            should_quit: false,
            app_state,
            event_sender,
            in_flight: None,
        };

        app.update_focus();
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn chat_view(&self) -> &ChatView {
        &self.chat_view
    }

    pub fn input_box(&self) -> &InputBox {
        &self.input_box
    }

    pub fn status_bar(&self) -> &StatusBar {
        &self.status_bar
    }

    pub fn focused_panel(&self) -> FocusedPanel {
        self.focused_panel
    }

    pub fn handle_event(&mut self, event: Event) {
        // Ticks drive the typing indicator no matter what has focus
        if matches!(event, Event::Tick) {
            self.chat_view.handle_event(&event);
            return;
        }

        // Help popup takes priority
        if self.help_popup.is_visible() && self.help_popup.handle_event(&event) {
            return;
        }

        match event {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    return;
                }
                if self.handle_global_keys(key) {
                    return;
                }
                self.handle_panel_specific_keys(key);
            }
            Event::Mouse(_) => {
                self.chat_view.handle_event(&event);
            }
            Event::ReplyReceived(reply) => {
                self.finish_request(Ok(reply));
            }
            Event::ReplyFailed(reason) => {
                self.finish_request(Err(reason));
            }
            Event::Tick | Event::Resize(_, _) => {}
        }
    }

    fn handle_global_keys(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) |
            (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
                self.quit();
                true
            }
            (KeyCode::F(1), _) | (KeyCode::Char('/'), KeyModifiers::CONTROL) => {
                self.help_popup.toggle();
                true
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.input_box.clear();
                true
            }
            (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::BackTab, _) => {
                self.toggle_panel();
                true
            }
            (KeyCode::Esc, KeyModifiers::NONE) => {
                self.set_focused_panel(FocusedPanel::InputBox);
                true
            }
            _ => false,
        }
    }

    fn handle_panel_specific_keys(&mut self, key: KeyEvent) {
        let handled = match self.focused_panel {
            FocusedPanel::ChatView => self.chat_view.handle_event(&Event::Key(key)),
            FocusedPanel::InputBox => self.input_box.handle_event(&Event::Key(key)),
        };

        if handled {
            return;
        }

        if self.focused_panel == FocusedPanel::InputBox
            && key.code == KeyCode::Enter
            && !key.modifiers.contains(KeyModifiers::SHIFT)
        {
            self.submit();
        }
    }

    /// Sends the current input as a question. Blank input is ignored and a
    /// second question is refused while the first is still pending.
    pub fn submit(&mut self) {
        let pending_text = self.input_box.get_content();
        let session_id = self.app_state.session_id().clone();

        match self.chat_view.conversation_mut().submit(&session_id, &pending_text) {
            Ok(SubmitOutcome::Ignored) => {}
            Ok(SubmitOutcome::Dispatched(request)) => {
                self.input_box.clear();
                self.input_box.set_waiting(true);
                self.chat_view.scroll_to_bottom();
                self.status_bar.set_connection_status(ConnectionStatus::Connecting);
                self.status_bar.set_status("Waiting for reply...");
                self.dispatch(request);
            }
            Err(ChatError::ReplyPending) => {
                self.status_bar
                    .set_status("Still waiting for the previous answer; your question was kept");
            }
            Err(e) => {
                self.status_bar.set_status(format!("Error: {}", e));
            }
        }
    }

    fn dispatch(&mut self, request: ChatRequest) {
        let service = self.app_state.answer_service();
        let sender = self.event_sender.clone();

        info!("Submitting question for session {}", request.session_id);
        self.in_flight = Some(tokio::spawn(async move {
            let event = match service.ask(request).await {
                Ok(reply) => Event::ReplyReceived(reply),
                Err(e) => {
                    error!("Answer request failed: {}", e);
                    Event::ReplyFailed(e.user_message())
                }
            };
            let _ = sender.send(event);
        }));
    }

    fn finish_request(&mut self, outcome: Result<ChatReply, String>) {
        self.in_flight = None;
        self.input_box.set_waiting(false);

        match &outcome {
            Ok(reply) => {
                debug!("Reply received with {} sources", reply.sources.len());
                self.status_bar.set_connection_status(ConnectionStatus::Connected);
                self.status_bar.set_status("Type your question (Enter to send)");
            }
            Err(reason) => {
                self.status_bar
                    .set_connection_status(ConnectionStatus::Error(reason.clone()));
                self.status_bar.set_status(format!("Error: {}", reason));
            }
        }

        if !self.chat_view.complete(outcome) {
            debug!("Ignoring reply with no request in flight");
        }
    }

    /// Stops the loop and abandons any pending request.
    pub fn quit(&mut self) {
        self.should_quit = true;
        self.shutdown();
    }

    pub fn shutdown(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            info!("Cancelling in-flight request");
            handle.abort();
        }
    }

    fn toggle_panel(&mut self) {
        let next = match self.focused_panel {
            FocusedPanel::ChatView => FocusedPanel::InputBox,
            FocusedPanel::InputBox => FocusedPanel::ChatView,
        };
        self.set_focused_panel(next);
    }

    fn set_focused_panel(&mut self, panel: FocusedPanel) {
        self.focused_panel = panel;
        self.update_focus();
    }

    fn update_focus(&mut self) {
        self.chat_view.unfocus();
        self.input_box.unfocus();

        let focused: &dyn Component = match self.focused_panel {
            FocusedPanel::ChatView => {
                self.chat_view.focus();
                &self.chat_view
            }
            FocusedPanel::InputBox => {
                self.input_box.focus();
                &self.input_box
            }
        };
        debug!("Focus moved to {}", focused.title());

        self.update_status_key_hints();
    }

    fn update_status_key_hints(&mut self) {
        let key_hints = match self.focused_panel {
            FocusedPanel::ChatView => vec![
                KeyHint::new("↑/↓", "Scroll"),
                KeyHint::new("Tab", "Input"),
                KeyHint::new("F1", "Help"),
            ],
            FocusedPanel::InputBox => vec![
                KeyHint::new("Enter", "Send"),
                KeyHint::new("Tab", "Transcript"),
                KeyHint::new("F1", "Help"),
            ],
        };
        self.status_bar.set_key_hints(key_hints);
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),      // Chat view
                Constraint::Length(3),   // Input box
                Constraint::Length(1),   // Status bar
            ])
            .split(frame.size());

        self.chat_view.render(frame, chunks[0], &self.theme);
        self.input_box.render(frame, chunks[1], &self.theme);
        self.status_bar.render(frame, chunks[2], &self.theme);

        // Render help popup last (on top)
        self.help_popup.render(frame, frame.size(), &self.theme);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
