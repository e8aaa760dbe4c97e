use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Debug)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub border: Color,
    pub highlight: Color,
    pub secondary: Color,
    pub surface: Color,
}

/// Palette for the chat screen. Roles map to bubbles: `accent` for the user,
/// `success` for the assistant, `error` for failure notices and `warning`
/// for the sources heading.
impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(36, 41, 51),
            fg: Color::Rgb(216, 222, 233),
            accent: Color::Rgb(136, 192, 208),
            success: Color::Rgb(163, 190, 140),
            warning: Color::Rgb(235, 203, 139),
            error: Color::Rgb(191, 97, 106),
            border: Color::Rgb(76, 86, 106),
            highlight: Color::Rgb(143, 188, 187),
            secondary: Color::Rgb(129, 161, 193),
            surface: Color::Rgb(46, 52, 64),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(253, 246, 227),
            fg: Color::Rgb(88, 110, 117),
            accent: Color::Rgb(38, 139, 210),
            success: Color::Rgb(133, 153, 0),
            warning: Color::Rgb(181, 137, 0),
            error: Color::Rgb(220, 50, 47),
            border: Color::Rgb(147, 161, 161),
            highlight: Color::Rgb(42, 161, 152),
            secondary: Color::Rgb(101, 123, 131),
            surface: Color::Rgb(238, 232, 213),
        }
    }

    /// Theme by config name; anything unknown falls back to dark.
    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn highlight(&self) -> Style {
        Style::default().fg(self.highlight).add_modifier(Modifier::BOLD)
    }

    pub fn secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn code(&self) -> Style {
        Style::default().fg(self.highlight).bg(self.surface)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
