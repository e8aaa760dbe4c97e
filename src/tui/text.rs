//! Width-aware wrapping for styled lines.

use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Plain text of a line, for tests and width checks.
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    lines.into_iter().flat_map(|line| wrap_line(line, width)).collect()
}

/// Greedy word wrap that keeps span styles. Words longer than `width` are
/// split at character boundaries; whitespace at a wrap point is dropped.
/// Continuation lines repeat quote bars and hang under list markers.
pub fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line];
    }

    let mut builder = LineBuilder::new(width, hanging_prefix(&line, width));
    for span in &line.spans {
        for (segment, is_space) in segments(&span.content) {
            if is_space {
                builder.push_space(segment, span.style);
            } else {
                builder.push_word(segment, span.style);
            }
        }
    }
    builder.finish()
}

/// Splits text into alternating whitespace / non-whitespace runs.
fn segments(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (index, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match current {
            Some(kind) if kind != is_space => {
                out.push((&text[start..index], kind));
                start = index;
                current = Some(is_space);
            }
            None => current = Some(is_space),
            _ => {}
        }
    }
    if let Some(kind) = current {
        out.push((&text[start..], kind));
    }
    out
}

enum PrefixToken {
    QuoteBar,
    Marker,
}

fn prefix_token(content: &str) -> Option<PrefixToken> {
    if content.contains('│') && content.chars().all(|c| c == '│' || c == ' ') {
        return Some(PrefixToken::QuoteBar);
    }

    let marker = content.trim_start();
    let is_number = marker
        .strip_suffix(". ")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    if marker == "• " || marker == "[x] " || marker == "[ ] " || is_number {
        return Some(PrefixToken::Marker);
    }
    None
}

/// Spans that open every continuation line: quote bars as-is, list and task
/// markers as blank space of the same width.
fn hanging_prefix(line: &Line<'static>, width: usize) -> Vec<Span<'static>> {
    let mut prefix = Vec::new();
    for span in &line.spans {
        match prefix_token(&span.content) {
            Some(PrefixToken::QuoteBar) => prefix.push(span.clone()),
            Some(PrefixToken::Marker) => {
                prefix.push(Span::styled(" ".repeat(span.content.width()), span.style))
            }
            None => break,
        }
    }

    let prefix_width: usize = prefix.iter().map(|s| s.content.width()).sum();
    if prefix_width * 2 > width {
        return Vec::new();
    }
    prefix
}

struct LineBuilder {
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    used: usize,
    continuation: bool,
    hang: Vec<Span<'static>>,
    hang_width: usize,
}

impl LineBuilder {
    fn new(width: usize, hang: Vec<Span<'static>>) -> Self {
        let hang_width = hang.iter().map(|s| s.content.width()).sum();
        Self {
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            used: 0,
            continuation: false,
            hang,
            hang_width,
        }
    }

    /// Columns taken by the prefix before any content.
    fn line_start(&self) -> usize {
        self.hang_width
    }

    fn push_space(&mut self, text: &str, style: Style) {
        if self.continuation && self.used == self.line_start() {
            return;
        }
        let w = text.width();
        if self.used + w > self.width {
            self.break_line();
            return;
        }
        self.append(text, style, w);
    }

    fn push_word(&mut self, text: &str, style: Style) {
        let w = text.width();
        if self.used + w <= self.width {
            self.append(text, style, w);
            return;
        }
        if self.used > self.line_start() {
            self.break_line();
        }
        if self.used + w <= self.width {
            self.append(text, style, w);
            return;
        }

        // Hard split
        let mut chunk = String::new();
        let mut chunk_width = 0;
        for ch in text.chars() {
            let cw = ch.width().unwrap_or(0);
            if self.used + chunk_width + cw > self.width
                && self.used + chunk_width > self.line_start()
            {
                let taken = std::mem::take(&mut chunk);
                self.append(&taken, style, chunk_width);
                self.break_line();
                chunk_width = 0;
            }
            chunk.push(ch);
            chunk_width += cw;
        }
        if !chunk.is_empty() {
            self.append(&chunk, style, chunk_width);
        }
    }

    fn append(&mut self, text: &str, style: Style, w: usize) {
        match self.spans.last_mut() {
            Some(last) if last.style == style => {
                last.content.to_mut().push_str(text);
            }
            _ => self.spans.push(Span::styled(text.to_string(), style)),
        }
        self.used += w;
    }

    fn break_line(&mut self) {
        let mut spans = std::mem::take(&mut self.spans);
        while spans.last().is_some_and(|s| s.content.trim().is_empty()) {
            spans.pop();
        }
        if let Some(last) = spans.last_mut() {
            let trimmed = last.content.trim_end().to_string();
            last.content = trimmed.into();
        }
        self.lines.push(Line::from(spans));
        self.continuation = true;
        self.spans = self.hang.clone();
        self.used = self.hang_width;
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if self.used > self.line_start() || self.lines.is_empty() {
            let spans = std::mem::take(&mut self.spans);
            self.lines.push(Line::from(spans));
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_short_line_untouched() {
        let wrapped = wrap_line(Line::from("Short"), 20);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(line_text(&wrapped[0]), "Short");
    }

    #[test]
    fn test_wraps_on_words() {
        let wrapped = wrap_line(Line::from("Hello world this is a long line"), 11);
        let texts: Vec<String> = wrapped.iter().map(line_text).collect();
        assert_eq!(texts, vec!["Hello world", "this is a", "long line"]);
    }

    #[test]
    fn test_long_word_is_split() {
        let wrapped = wrap_line(Line::from("abcdefghij"), 4);
        let texts: Vec<String> = wrapped.iter().map(line_text).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_styles_survive_wrapping() {
        let red = Style::default().fg(Color::Red);
        let blue = Style::default().fg(Color::Blue);
        let line = Line::from(vec![
            Span::styled("alpha beta ", red),
            Span::styled("gamma delta", blue),
        ]);

        let wrapped = wrap_line(line, 11);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].spans[0].style, red);
        assert_eq!(line_text(&wrapped[1]), "gamma delta");
        assert_eq!(wrapped[1].spans[0].style, blue);
    }

    #[test]
    fn test_leading_indent_is_kept() {
        let wrapped = wrap_line(Line::from("  one two three"), 9);
        assert_eq!(line_text(&wrapped[0]), "  one two");
        assert_eq!(line_text(&wrapped[1]), "three");
    }

    #[test]
    fn test_list_item_hangs_under_marker() {
        let line = Line::from(vec![Span::raw("• "), Span::raw("alpha beta gamma delta")]);
        let texts: Vec<String> = wrap_line(line, 12).iter().map(line_text).collect();
        assert_eq!(texts, vec!["• alpha beta", "  gamma", "  delta"]);
    }

    #[test]
    fn test_numbered_task_item_hangs_under_both_markers() {
        let line = Line::from(vec![
            Span::raw("  2. "),
            Span::raw("[x] "),
            Span::raw("submit the leave form"),
        ]);
        let texts: Vec<String> = wrap_line(line, 20).iter().map(line_text).collect();
        assert_eq!(texts, vec!["  2. [x] submit the", "         leave form"]);
    }

    #[test]
    fn test_quote_bar_repeats() {
        let quote = Style::default().fg(Color::Gray);
        let line = Line::from(vec![
            Span::styled("│ ", quote),
            Span::styled("one two three four", quote),
        ]);
        let wrapped = wrap_line(line, 9);
        let texts: Vec<String> = wrapped.iter().map(line_text).collect();
        assert_eq!(texts, vec!["│ one two", "│ three", "│ four"]);
        assert_eq!(wrapped[1].spans[0].style, quote);
    }

    #[test]
    fn test_long_word_under_marker_stays_inside_width() {
        let line = Line::from(vec![Span::raw("• "), Span::raw("abcdefghijkl")]);
        let wrapped = wrap_line(line, 6);
        for line in &wrapped {
            assert!(line.width() <= 6);
        }
        let texts: Vec<String> = wrapped.iter().map(line_text).collect();
        assert_eq!(texts, vec!["• abcd", "  efgh", "  ijkl"]);
    }

    #[test]
    fn test_plain_text_bullet_is_not_a_marker() {
        let wrapped = wrap_line(Line::from("• alpha beta gamma"), 12);
        assert_eq!(line_text(&wrapped[1]), "gamma");
    }

    #[test]
    fn test_wide_characters() {
        let wrapped = wrap_line(Line::from("你好你好你好"), 4);
        for line in &wrapped {
            assert!(line.width() <= 4);
        }
        assert_eq!(wrapped.len(), 3);
    }
}
