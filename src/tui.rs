//! ANSI escape helpers and the color theme for terminal and wire output.
//!
//! Command results carry these sequences over the API too (`ansi: true` in
//! the envelopes); the frontend converts them for display.

use crate::config::schema::ColorsConfig;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RED: &str = "\x1b[31m";
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Convert a `#rrggbb` hex color to a truecolor ANSI foreground sequence.
///
/// Returns an empty string for anything that isn't a 7-character hex color,
/// so a broken config value degrades to uncolored text.
pub fn hex_to_ansi(hex: &str) -> String {
    let Some(digits) = hex.strip_prefix('#') else {
        return String::new();
    };
    if digits.len() != 6 {
        return String::new();
    }
    let parse = |s: &str| u8::from_str_radix(s, 16);
    match (
        parse(&digits[0..2]),
        parse(&digits[2..4]),
        parse(&digits[4..6]),
    ) {
        (Ok(r), Ok(g), Ok(b)) => format!("\x1b[38;2;{};{};{}m", r, g, b),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Resolved ANSI sequences for the configured color scheme.
#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub info: String,
    pub accent: String,
}

impl Theme {
    pub fn from_colors(colors: &ColorsConfig) -> Self {
        Self {
            primary: hex_to_ansi(&colors.primary),
            secondary: hex_to_ansi(&colors.secondary),
            success: hex_to_ansi(&colors.success),
            error: hex_to_ansi(&colors.error),
            warning: hex_to_ansi(&colors.warning),
            info: hex_to_ansi(&colors.info),
            accent: hex_to_ansi(&colors.accent),
        }
    }

    /// Wrap `text` in the success color.
    pub fn ok(&self, text: &str) -> String {
        format!("{}{}{}", self.success, text, RESET)
    }

    /// Wrap `text` in the error color.
    pub fn err(&self, text: &str) -> String {
        format!("{}{}{}", self.error, text, RESET)
    }

    /// Wrap `text` in the warning color.
    pub fn warn(&self, text: &str) -> String {
        format!("{}{}{}", self.warning, text, RESET)
    }

    /// Wrap `text` in the dim secondary color.
    pub fn dim(&self, text: &str) -> String {
        format!("{}{}{}", self.secondary, text, RESET)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_colors(&ColorsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_ansi_valid() {
        assert_eq!(hex_to_ansi("#ff0000"), "\x1b[38;2;255;0;0m");
        assert_eq!(hex_to_ansi("#00ff7f"), "\x1b[38;2;0;255;127m");
    }

    #[test]
    fn test_hex_to_ansi_invalid() {
        assert_eq!(hex_to_ansi("ff0000"), "");
        assert_eq!(hex_to_ansi("#fff"), "");
        assert_eq!(hex_to_ansi("#zzzzzz"), "");
    }

    #[test]
    fn test_theme_accessors_wrap_and_reset() {
        let theme = Theme::default();
        assert_eq!(theme.ok("done"), format!("{}done{}", theme.success, RESET));
        assert_eq!(theme.err("boom"), format!("{}boom{}", theme.error, RESET));
        assert_eq!(
            theme.warn("careful"),
            format!("{}careful{}", theme.warning, RESET)
        );
        // Default warning color is #ffff00.
        assert_eq!(theme.warning, hex_to_ansi("#ffff00"));
    }
}
