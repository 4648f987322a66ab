use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub border_focused: Color,
    pub border_unfocused: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_highlight: Color,
    pub status_playing: Color,
    pub status_stopped: Color,
    pub status_finished: Color,
    pub status_failed: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border_focused: Color::Rgb(118, 227, 73),
            border_unfocused: Color::White,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_highlight: Color::Yellow,
            status_playing: Color::Green,
            status_stopped: Color::Yellow,
            status_finished: Color::Cyan,
            status_failed: Color::Red,
        }
    }
}

pub static THEME: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(Theme::default);

pub fn get_theme() -> &'static Theme {
    &THEME
}
