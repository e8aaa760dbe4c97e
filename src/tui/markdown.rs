//! Markdown rendering for assistant answers.
//!
//! [`render_markdown`] turns answer text into styled ratatui lines: headings,
//! emphasis, inline and fenced code, ordered and bulleted lists, task
//! markers, blockquotes, links and GFM tables.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::tui::Theme;

pub fn render_markdown(input: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_TABLES);

    let mut renderer = MarkdownRenderer::new(MarkdownStyles::from_theme(theme));
    for event in Parser::new_ext(input, options) {
        renderer.handle_event(event);
    }
    renderer.finish()
}

#[derive(Debug, Clone)]
struct MarkdownStyles {
    text: Style,
    heading: Style,
    code: Style,
    emphasis: Style,
    strong: Style,
    strikethrough: Style,
    link: Style,
    list_marker: Style,
    blockquote: Style,
}

impl MarkdownStyles {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            text: theme.text(),
            heading: theme.accent().add_modifier(Modifier::BOLD),
            code: theme.code(),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            link: theme.accent().add_modifier(Modifier::UNDERLINED),
            list_marker: theme.secondary(),
            blockquote: theme.secondary().add_modifier(Modifier::ITALIC),
        }
    }
}

struct MarkdownRenderer {
    styles: MarkdownStyles,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    /// One entry per open list: `Some(next number)` for ordered lists.
    list_stack: Vec<Option<u64>>,
    pending_marker: Option<String>,
    in_code_block: bool,
    quote_depth: usize,
    table_cell: usize,
}

impl MarkdownRenderer {
    fn new(styles: MarkdownStyles) -> Self {
        Self {
            styles,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: Vec::new(),
            list_stack: Vec::new(),
            pending_marker: None,
            in_code_block: false,
            quote_depth: 0,
            table_cell: 0,
        }
    }

    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_line();
                let prefix = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    _ => "### ",
                };
                self.current_spans
                    .push(Span::styled(prefix.to_string(), self.styles.heading));
                self.style_stack.push(self.styles.heading);
            }
            Event::End(TagEnd::Heading(_)) => {
                self.style_stack.pop();
                self.flush_line();
                self.blank_line();
            }

            Event::Start(Tag::Emphasis) => self.style_stack.push(self.styles.emphasis),
            Event::Start(Tag::Strong) => self.style_stack.push(self.styles.strong),
            Event::Start(Tag::Strikethrough) => self.style_stack.push(self.styles.strikethrough),
            Event::Start(Tag::Link { .. }) => self.style_stack.push(self.styles.link),
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link) => {
                self.style_stack.pop();
            }

            Event::Start(Tag::CodeBlock(_)) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.flush_line();
                self.in_code_block = false;
                self.blank_line();
            }

            Event::Start(Tag::List(start)) => {
                self.flush_line();
                self.list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush_line();
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                let marker = match self.list_stack.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{indent}{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.pending_marker = Some(marker);
            }
            Event::End(TagEnd::Item) => self.flush_line(),
            Event::TaskListMarker(checked) => {
                let checkbox = if checked { "[x] " } else { "[ ] " };
                self.take_marker();
                self.current_spans
                    .push(Span::styled(checkbox.to_string(), self.styles.list_marker));
            }

            Event::Start(Tag::BlockQuote) => {
                self.flush_line();
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }

            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                self.flush_line();
                // Tight list items carry no paragraph gap
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }

            Event::Start(Tag::TableHead) => {
                self.flush_line();
                self.table_cell = 0;
                self.style_stack.push(self.styles.strong);
            }
            Event::End(TagEnd::TableHead) => {
                self.style_stack.pop();
                self.flush_line();
            }
            Event::Start(Tag::TableRow) => {
                self.flush_line();
                self.table_cell = 0;
            }
            Event::End(TagEnd::TableRow) => self.flush_line(),
            Event::Start(Tag::TableCell) => {
                if self.table_cell > 0 {
                    self.current_spans
                        .push(Span::styled(" │ ".to_string(), self.styles.list_marker));
                }
                self.table_cell += 1;
            }
            Event::End(TagEnd::Table) => self.blank_line(),

            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => {
                self.prefix_line();
                self.current_spans
                    .push(Span::styled(code.to_string(), self.styles.code));
            }
            Event::SoftBreak => self.add_text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(20),
                    self.styles.list_marker,
                )));
            }
            _ => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.current_spans
                    .push(Span::styled(format!("  {line}"), self.styles.code));
                self.flush_line();
            }
            return;
        }

        self.prefix_line();
        let style = self.current_style();
        self.current_spans.push(Span::styled(text.to_string(), style));
    }

    /// List marker and quote bar for the first span of a line.
    fn prefix_line(&mut self) {
        if self.current_spans.is_empty() && self.quote_depth > 0 {
            self.current_spans.push(Span::styled(
                "│ ".repeat(self.quote_depth),
                self.styles.blockquote,
            ));
        }
        self.take_marker();
    }

    fn take_marker(&mut self) {
        if let Some(marker) = self.pending_marker.take() {
            self.current_spans
                .push(Span::styled(marker, self.styles.list_marker));
        }
    }

    fn current_style(&self) -> Style {
        let base = if self.quote_depth > 0 {
            self.styles.blockquote
        } else {
            self.styles.text
        };
        self.style_stack
            .iter()
            .fold(base, |style, layer| style.patch(*layer))
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::text::line_text;

    fn render(input: &str) -> Vec<String> {
        render_markdown(input, &Theme::default())
            .iter()
            .map(line_text)
            .collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(render("Hello"), vec!["Hello"]);
    }

    #[test]
    fn test_empty() {
        assert!(render("").is_empty());
    }

    #[test]
    fn test_paragraphs_are_separated() {
        assert_eq!(render("First.\n\nSecond."), vec!["First.", "", "Second."]);
    }

    #[test]
    fn test_heading() {
        let lines = render("## Leave policy\nEmployees get 20 days.");
        assert_eq!(lines[0], "## Leave policy");
        assert_eq!(lines[2], "Employees get 20 days.");
    }

    #[test]
    fn test_bold_is_styled() {
        let lines = render_markdown("**bold** text", &Theme::default());
        assert_eq!(line_text(&lines[0]), "bold text");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(!lines[0].spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_bullet_list() {
        assert_eq!(render("- one\n- two"), vec!["• one", "• two"]);
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(render("3. three\n4. four"), vec!["3. three", "4. four"]);
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(render("- outer\n  - inner"), vec!["• outer", "  • inner"]);
    }

    #[test]
    fn test_task_list() {
        assert_eq!(render("- [x] done\n- [ ] todo"), vec!["• [x] done", "• [ ] todo"]);
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(render("Use `leave_form` here"), vec!["Use leave_form here"]);
    }

    #[test]
    fn test_code_block() {
        assert_eq!(render("```\nline one\nline two\n```"), vec!["  line one", "  line two"]);
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(render("> quoted"), vec!["│ quoted"]);
    }

    #[test]
    fn test_table() {
        let lines = render("| Type | Days |\n|---|---|\n| Sick | 10 |");
        assert_eq!(lines, vec!["Type │ Days", "Sick │ 10"]);
    }
}
