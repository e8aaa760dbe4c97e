use crossterm::event::{KeyCode, KeyEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::chat::{format_citation, ChatMessage, ChatReply, Conversation, MessageRole, PathSeparator};
use crate::tui::{components::Component, markdown::render_markdown, text::wrap_lines, Event, Theme};

const TYPING_FRAMES: [&str; 4] = ["·  ", "·· ", "···", " ··"];

/// Transcript panel. Owns the [`Conversation`] and renders one bubble per
/// message, plus a typing indicator while a reply is pending.
pub struct ChatView {
    conversation: Conversation,
    citation_names: PathSeparator,
    show_timestamps: bool,
    is_focused: bool,
    auto_scroll: bool,
    title: String,
    scroll_offset: usize,
    typing_frame: usize,
}

impl ChatView {
    pub fn new(title: impl Into<String>, citation_names: PathSeparator) -> Self {
        Self {
            conversation: Conversation::new(),
            citation_names,
            show_timestamps: true,
            is_focused: false,
            auto_scroll: true,
            title: title.into(),
            scroll_offset: 0,
            typing_frame: 0,
        }
    }

    pub fn with_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn unfocus(&mut self) {
        self.is_focused = false;
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Feeds a finished request back into the conversation and follows the
    /// new bubble.
    pub fn complete(&mut self, outcome: Result<ChatReply, String>) -> bool {
        let appended = self.conversation.complete(outcome).is_ok();
        if appended && self.auto_scroll {
            self.scroll_to_bottom();
        }
        appended
    }

    pub fn on_tick(&mut self) {
        if self.conversation.is_awaiting_reply() {
            self.typing_frame = (self.typing_frame + 1) % TYPING_FRAMES.len();
        } else {
            self.typing_frame = 0;
        }
    }

    pub fn scroll_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
            self.auto_scroll = false;
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
        // Re-enabled in render once the bottom is reached
        self.auto_scroll = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = usize::MAX; // Will be clamped in render
        self.auto_scroll = true;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = false;
    }

    fn role_header(message: &ChatMessage, theme: &Theme) -> (&'static str, Style) {
        match message.role {
            MessageRole::User => ("You", theme.accent().add_modifier(Modifier::BOLD)),
            MessageRole::Assistant => ("Assistant", theme.success().add_modifier(Modifier::BOLD)),
            MessageRole::System => ("Error", theme.error().add_modifier(Modifier::BOLD)),
        }
    }

    fn header_line(&self, message: &ChatMessage, theme: &Theme) -> Line<'static> {
        let (label, style) = Self::role_header(message, theme);
        let mut spans = vec![Span::styled(label, style)];

        if self.show_timestamps {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                message.timestamp.format("%H:%M").to_string(),
                theme.secondary(),
            ));
        }

        if let Some(intent) = &message.intent {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(intent.to_lowercase().replace('_', " "), theme.secondary()));
        }

        Line::from(spans)
    }

    fn body_lines(&self, message: &ChatMessage, theme: &Theme) -> Vec<Line<'static>> {
        match message.role {
            MessageRole::User => message
                .text
                .lines()
                .map(|line| Line::from(Span::styled(line.to_string(), theme.text())))
                .collect(),
            MessageRole::Assistant => render_markdown(&message.text, theme),
            MessageRole::System => vec![Line::from(Span::styled(message.text.clone(), theme.error()))],
        }
    }

    fn sources_lines(&self, message: &ChatMessage, theme: &Theme) -> Vec<Line<'static>> {
        if !message.has_sources() {
            return Vec::new();
        }

        let mut lines = vec![
            Line::default(),
            Line::from(Span::styled("Sources:", theme.warning().add_modifier(Modifier::BOLD))),
        ];
        lines.extend(message.sources.iter().map(|citation| {
            Line::from(vec![
                Span::styled("• ", theme.secondary()),
                Span::styled(format_citation(citation, &self.citation_names), theme.secondary()),
            ])
        }));
        lines
    }

    fn typing_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                "Assistant",
                theme.success().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw("  "),
                Span::styled(TYPING_FRAMES[self.typing_frame], theme.secondary()),
            ]),
        ]
    }

    /// Every line of the transcript, wrapped to `width` columns.
    pub fn build_lines(&self, theme: &Theme, width: usize) -> Vec<Line<'static>> {
        let content_width = width.saturating_sub(2);
        let mut all_lines: Vec<Line<'static>> = Vec::new();

        for message in self.conversation.transcript() {
            all_lines.push(self.header_line(message, theme));

            let mut body = self.body_lines(message, theme);
            body.extend(self.sources_lines(message, theme));
            for line in wrap_lines(body, content_width) {
                let mut spans = vec![Span::raw("  ")]; // Indent content
                spans.extend(line.spans);
                all_lines.push(Line::from(spans));
            }

            // Add separator
            all_lines.push(Line::from(""));
        }

        if self.conversation.is_awaiting_reply() {
            all_lines.extend(self.typing_lines(theme));
        }

        all_lines
    }
}

impl Component for ChatView {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.is_focused {
            theme.accent()
        } else {
            theme.border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", self.title));

        if self.conversation.is_empty() {
            let empty_message = Paragraph::new("No messages yet. Ask a question to get started.")
                .block(block)
                .alignment(Alignment::Center)
                .style(theme.secondary());

            frame.render_widget(empty_message, area);
            return;
        }

        let content_width = area.width.saturating_sub(2) as usize; // Borders
        let content_height = area.height.saturating_sub(2) as usize;

        let all_lines = self.build_lines(theme, content_width);
        let total_lines = all_lines.len();
        let max_scroll = total_lines.saturating_sub(content_height);

        if self.auto_scroll || self.scroll_offset >= max_scroll {
            self.scroll_offset = max_scroll;
            self.auto_scroll = true;
        }

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll_offset)
            .take(content_height)
            .collect();

        let paragraph = Paragraph::new(visible_lines).block(block).style(theme.normal());
        frame.render_widget(paragraph, area);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Tick => {
                self.on_tick();
                false
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => {
                    self.scroll_up();
                    true
                }
                MouseEventKind::ScrollDown => {
                    self.scroll_down();
                    true
                }
                _ => false,
            },
            Event::Key(KeyEvent { code, .. }) if self.is_focused => match code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.scroll_up();
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.scroll_down();
                    true
                }
                KeyCode::Home | KeyCode::Char('g') => {
                    self.scroll_to_top();
                    true
                }
                KeyCode::End | KeyCode::Char('G') => {
                    self.scroll_to_bottom();
                    true
                }
                KeyCode::PageUp => {
                    for _ in 0..10 {
                        self.scroll_up();
                    }
                    true
                }
                KeyCode::PageDown => {
                    for _ in 0..10 {
                        self.scroll_down();
                    }
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn title(&self) -> &str {
        "ChatView"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Citation, SessionId};
    use crate::tui::text::line_text;

    fn view() -> ChatView {
        ChatView::new("Test", PathSeparator::Backslash).with_timestamps(false)
    }

    fn texts(view: &ChatView) -> Vec<String> {
        view.build_lines(&Theme::default(), 80).iter().map(line_text).collect()
    }

    fn ask(view: &mut ChatView, text: &str) {
        view.conversation_mut()
            .submit(&SessionId::default(), text)
            .unwrap();
    }

    #[test]
    fn test_answer_without_sources() {
        let mut view = view();
        ask(&mut view, "Hi");
        view.complete(Ok(ChatReply::new("Hello")));

        let lines = texts(&view);
        assert_eq!(lines, vec!["You", "  Hi", "", "Assistant", "  Hello", ""]);
        assert!(!lines.iter().any(|l| l.contains("Sources")));
    }

    #[test]
    fn test_answer_with_sources() {
        let mut view = view();
        ask(&mut view, "Leave?");
        view.complete(Ok(
            ChatReply::new("X").with_sources(vec![Citation::new("C:\\docs\\policy.pdf", 4)])
        ));

        let lines = texts(&view);
        assert!(lines.contains(&"  Sources:".to_string()));
        assert!(lines.contains(&"  • policy.pdf — page 4".to_string()));
    }

    #[test]
    fn test_typing_indicator_while_waiting() {
        let mut view = view();
        ask(&mut view, "Hi");

        let waiting = texts(&view);
        assert_eq!(waiting.last().map(String::as_str), Some("  ·  "));
        assert_eq!(waiting[waiting.len() - 2], "Assistant");

        view.complete(Ok(ChatReply::new("Hello")));
        let done = texts(&view);
        assert!(!done.iter().any(|l| l.contains('·')));
    }

    #[test]
    fn test_typing_indicator_animates_on_tick() {
        let mut view = view();
        ask(&mut view, "Hi");
        view.on_tick();
        assert_eq!(texts(&view).last().map(String::as_str), Some("  ·· "));

        view.complete(Err("offline".to_string()));
        view.on_tick();
        assert_eq!(view.typing_frame, 0);
        assert!(!texts(&view).iter().any(|l| l.contains('·')));
    }

    #[test]
    fn test_wrapped_bullet_hangs_under_marker() {
        let mut view = view();
        ask(&mut view, "Hi");
        view.complete(Ok(ChatReply::new("- alpha beta gamma delta epsilon")));

        let lines: Vec<String> = view
            .build_lines(&Theme::default(), 16)
            .iter()
            .map(line_text)
            .collect();
        assert!(lines.contains(&"  • alpha beta".to_string()));
        assert!(lines.contains(&"    gamma delta".to_string()));
        assert!(lines.contains(&"    epsilon".to_string()));
    }

    #[test]
    fn test_error_bubble() {
        let mut view = view();
        ask(&mut view, "Hi");
        view.complete(Err("Could not reach the answer service.".to_string()));

        let lines = texts(&view);
        assert_eq!(lines[3], "Error");
        assert_eq!(lines[4], "  Could not reach the answer service.");
    }

    #[test]
    fn test_assistant_markdown_is_rendered() {
        let mut view = view();
        ask(&mut view, "Steps?");
        view.complete(Ok(ChatReply::new("**Steps**\n\n- fill form\n- submit")));

        let lines = texts(&view);
        assert!(lines.contains(&"  Steps".to_string()));
        assert!(lines.contains(&"  • fill form".to_string()));
    }

    #[test]
    fn test_user_text_is_not_markdown() {
        let mut view = view();
        ask(&mut view, "**literal**");
        assert_eq!(texts(&view)[1], "  **literal**");
    }

    #[test]
    fn test_intent_in_header() {
        let mut view = view();
        ask(&mut view, "Hi");
        let mut reply = ChatReply::new("Hello");
        reply.intent = Some("LEAVE_AND_TIME_OFF".to_string());
        view.complete(Ok(reply));

        assert_eq!(texts(&view)[3], "Assistant | leave and time off");
    }

    #[test]
    fn test_long_answers_wrap_inside_panel() {
        let mut view = view();
        ask(&mut view, "Hi");
        view.complete(Ok(ChatReply::new("word ".repeat(40))));

        for line in view.build_lines(&Theme::default(), 30) {
            assert!(line.width() <= 30);
        }
    }

    #[test]
    fn test_stray_completion_is_ignored() {
        let mut view = view();
        assert!(!view.complete(Ok(ChatReply::new("stray"))));
        assert!(view.conversation().is_empty());
    }
}
