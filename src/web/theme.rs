//! Look-and-feel options offered in the sidebar

/// Fonts offered in the UI
pub const FONTS: [&str; 5] = ["Roboto", "Open Sans", "Lato", "Merriweather", "Georgia"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
    Book,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::Book];

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light Mode",
            Theme::Dark => "Dark Mode",
            Theme::Book => "Book Mode",
        }
    }

    /// Unknown labels fall back to the light theme
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|theme| theme.label() == label)
            .unwrap_or(Theme::Light)
    }

    /// (background, text) colours
    pub fn colors(&self) -> (&'static str, &'static str) {
        match self {
            Theme::Light => ("#ffffff", "#000000"),
            Theme::Dark => ("#121212", "#ffffff"),
            Theme::Book => ("#fdf6e3", "#333333"),
        }
    }
}

/// Pick a font from the offered list, defaulting to the first one
pub fn resolve_font(requested: &str) -> &'static str {
    FONTS
        .iter()
        .copied()
        .find(|font| *font == requested)
        .unwrap_or(FONTS[0])
}

/// Stylesheet applying `font` and `theme` to the page and its inputs
pub fn custom_css(font: &str, theme: Theme) -> String {
    let font = resolve_font(font);
    let (bg_color, text_color) = theme.colors();

    format!(
        r#"
    body, main, .sidebar {{
        background-color: {bg_color};
        color: {text_color};
        font-family: '{font}', sans-serif;
    }}
    input, textarea, select {{
        background-color: {bg_color} !important;
        color: {text_color} !important;
        font-family: '{font}', sans-serif;
    }}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_colors() {
        assert_eq!(Theme::from_label("Light Mode").colors(), ("#ffffff", "#000000"));
        assert_eq!(Theme::from_label("Dark Mode").colors(), ("#121212", "#ffffff"));
        assert_eq!(Theme::from_label("Book Mode").colors(), ("#fdf6e3", "#333333"));
        assert_eq!(Theme::from_label("Neon Mode"), Theme::Light);
    }

    #[test]
    fn test_custom_css() {
        let css = custom_css("Lato", Theme::Dark);
        assert!(css.contains("background-color: #121212;"));
        assert!(css.contains("font-family: 'Lato', sans-serif;"));
    }

    #[test]
    fn test_unknown_font_cannot_inject_css() {
        let css = custom_css("x'; } body { display: none", Theme::Light);
        assert!(css.contains("'Roboto'"));
        assert!(!css.contains("display: none"));
    }
}
