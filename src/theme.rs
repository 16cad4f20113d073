//! Colour palette for the catalogue UI.
//! Defaults mirror the classic menu-button colours; accent, text and danger
//! can be overridden from the `[theme]` config section.

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Normal and hover (selected) colours of a menu button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonColors {
    pub normal: Color,
    pub hover: Color,
}

impl ButtonColors {
    const fn new(normal: Color, hover: Color) -> Self {
        Self { normal, hover }
    }
}

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,           // Active borders, key hints
    pub danger: Color,           // Errors, destructive actions
    pub success: Color,          // Confirmations
    pub warning: Color,          // Status line
    pub text: Color,             // Primary text
    pub text_dim: Color,         // Hints, empty states
    pub bg_selected: Color,      // Selected list row
    pub inactive: Color,         // Unfocused borders
    pub header: Color,           // Field labels, section titles
    pub add: ButtonColors,
    pub search: ButtonColors,
    pub edit: ButtonColors,
    pub view_all: ButtonColors,
    pub exit: ButtonColors,
}

impl Default for Theme {
    fn default() -> Self {
        let pink = Color::Rgb(255, 182, 193);  // #FFB6C1
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(76, 175, 80),  // #4CAF50
            warning: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
            add: ButtonColors::new(Color::Rgb(255, 92, 147), pink),        // #FF5C93
            search: ButtonColors::new(Color::Rgb(128, 0, 128), pink),      // #800080
            edit: ButtonColors::new(Color::Rgb(255, 165, 0), pink),        // #FFA500
            view_all: ButtonColors::new(Color::Rgb(70, 130, 180), Color::Rgb(176, 224, 230)),
            exit: ButtonColors::new(Color::Rgb(255, 99, 71), pink),        // #FF6347
        }
    }
}

impl Theme {
    /// Defaults with any configured overrides applied
    pub fn from_config(config: &ThemeConfig) -> Self {
        let mut theme = Self::default();

        let overrides = [
            (&config.accent, &mut theme.accent),
            (&config.text, &mut theme.text),
            (&config.danger, &mut theme.danger),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                match Self::parse_hex_color(value) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring invalid theme colour '{}'", value),
                }
            }
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    pub fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');

        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
