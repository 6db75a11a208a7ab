//! Theme colors for the form
//! Defaults can be overridden per color from the `[theme]` table in config.toml

use ratatui::style::Color;

use crate::config::ThemeColors;

#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,           // Focused borders, key hints
    pub danger: Color,           // Generation errors
    pub success: Color,          // Generate button, finished output
    pub warning: Color,          // Status line feedback
    pub text: Color,             // Primary text
    pub text_dim: Color,         // Placeholders, hints
    pub bg_selected: Color,      // Selected style / focused button background
    pub inactive: Color,         // Unfocused borders
    pub header: Color,           // Page header
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(249, 226, 175),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Build the theme from config overrides; unparsable values keep the default
    pub fn from_config(colors: &ThemeColors) -> Self {
        let mut theme = Self::default();

        let overrides = [
            (&colors.accent, &mut theme.accent, "accent"),
            (&colors.danger, &mut theme.danger, "danger"),
            (&colors.success, &mut theme.success, "success"),
            (&colors.text, &mut theme.text, "text"),
            (&colors.text_dim, &mut theme.text_dim, "text_dim"),
            (&colors.inactive, &mut theme.inactive, "inactive"),
        ];

        for (value, slot, name) in overrides {
            if let Some(value) = value {
                match Self::parse_hex_color(value) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring invalid theme color {} = {:?}", name, value),
                }
            }
        }

        theme.header = theme.danger;
        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        // from_str_radix would also take a leading '+'
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#zzzzzz"), None);
        assert_eq!(Theme::parse_hex_color("#+f+f+f"), None);
        assert_eq!(Theme::parse_hex_color("+ff"), None);
    }

    #[test]
    fn test_overrides() {
        let theme = Theme::from_config(&ThemeColors {
            accent: Some("#010203".to_string()),
            danger: Some("#D35F5F".to_string()),
            text: Some("not a color".to_string()),
            ..Default::default()
        });

        assert_eq!(theme.accent, Color::Rgb(1, 2, 3));
        assert_eq!(theme.header, Color::Rgb(211, 95, 95));
        assert_eq!(theme.text, Theme::default().text);
    }
}
