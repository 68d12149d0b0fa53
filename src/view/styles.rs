//! Colors and styles of the rasterised scene.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

/// Parse a `#RRGGBB` color.
///
/// Returns `None` for anything else, including the short `#RGB` form.
pub fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

// ===== SceneStyles =====

/// Styles used when rasterising a scene.
///
/// Node colors come from the scene's palettes; this only holds the fixed
/// chrome (minimap, status bar) and the color switch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStyles {
    colors: ColorConfig,
    /// Minimap box background.
    pub minimap: Style,
    /// Visible-region outline inside the minimap.
    pub visible_region: Style,
    /// Status bar.
    pub status: Style,
    /// Forwarded warnings in the status bar.
    pub status_alert: Style,
}

impl Default for SceneStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::default())
    }
}

impl SceneStyles {
    /// Styles for the given color configuration.
    pub fn with_color_config(colors: ColorConfig) -> Self {
        if colors.colors_enabled() {
            Self {
                colors,
                minimap: Style::default().bg(Color::Rgb(0x20, 0x20, 0x20)),
                visible_region: Style::default().fg(Color::Yellow),
                status: Style::default().fg(Color::Black).bg(Color::Gray),
                status_alert: Style::default().fg(Color::Red).bg(Color::Gray),
            }
        } else {
            Self {
                colors,
                minimap: Style::default(),
                visible_region: Style::default().add_modifier(Modifier::BOLD),
                status: Style::default().add_modifier(Modifier::REVERSED),
                status_alert: Style::default()
                    .add_modifier(Modifier::REVERSED | Modifier::BOLD),
            }
        }
    }

    /// Foreground-only style for a palette color; plain when colors are off.
    pub fn fg(&self, hex: &str) -> Style {
        match self.color(hex) {
            Some(color) => Style::default().fg(color),
            None => Style::default(),
        }
    }

    /// Background-only style for a palette color; plain when colors are off.
    pub fn bg(&self, hex: &str) -> Style {
        match self.color(hex) {
            Some(color) => Style::default().bg(color),
            None => Style::default(),
        }
    }

    fn color(&self, hex: &str) -> Option<Color> {
        if self.colors.colors_enabled() {
            parse_hex(hex)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn parse_hex_accepts_six_digit_colors() {
        assert_eq!(parse_hex("#EB3E3E"), Some(Color::Rgb(0xEB, 0x3E, 0x3E)));
        assert_eq!(parse_hex("#ffffff"), Some(Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn parse_hex_rejects_other_forms() {
        assert_eq!(parse_hex("EB3E3E"), None);
        assert_eq!(parse_hex("#FFF"), None);
        assert_eq!(parse_hex("#GGGGGG"), None);
        assert_eq!(parse_hex("#ééé"), None);
    }

    #[test]
    fn disabled_colors_yield_plain_styles() {
        let styles = SceneStyles::with_color_config(ColorConfig::from_env_and_args(true));
        assert_eq!(styles.bg("#EB3E3E"), Style::default());
        assert_eq!(styles.fg("#EB3E3E"), Style::default());
    }

    #[test]
    fn enabled_colors_map_palette_values() {
        let styles = SceneStyles::default();
        assert_eq!(
            styles.bg("#FFA630"),
            Style::default().bg(Color::Rgb(0xFF, 0xA6, 0x30))
        );
        assert_eq!(styles.fg("not a color"), Style::default());
    }

    #[test]
    #[serial(topoview_env)]
    fn no_color_env_disables_colors() {
        std::env::set_var("NO_COLOR", "1");
        let config = ColorConfig::from_env_and_args(false);
        std::env::remove_var("NO_COLOR");
        assert!(!config.colors_enabled());
    }
}
