use std::fs;
use std::path::Path;

use ratatui::style::Color;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Theme {
    pub title_bg: Color,
    pub panel_bg: Color,
    pub chat_bg: Color,
    pub insight_bg: Color,
    pub input_bg: Color,
    pub status_bg: Color,
    pub text_fg: Color,
    pub muted_fg: Color,
    pub active_fg: Color,
    pub user_fg: Color,
    pub assistant_fg: Color,
    pub error_fg: Color,
    pub success_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title_bg: Color::Rgb(36, 36, 36),
            panel_bg: Color::Rgb(44, 44, 44),
            chat_bg: Color::Rgb(54, 54, 54),
            insight_bg: Color::Rgb(48, 48, 60),
            input_bg: Color::Rgb(62, 62, 62),
            status_bg: Color::Rgb(36, 36, 36),
            text_fg: Color::Rgb(225, 225, 225),
            muted_fg: Color::Rgb(185, 185, 185),
            active_fg: Color::Rgb(255, 255, 255),
            user_fg: Color::Rgb(90, 145, 200),
            assistant_fg: Color::Rgb(150, 200, 120),
            error_fg: Color::Rgb(230, 90, 90),
            success_fg: Color::Rgb(120, 200, 140),
        }
    }
}

impl Theme {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path_ref = path.as_ref();
        let contents = match fs::read_to_string(path_ref) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::debug!(path = %path_ref.display(), %err, "theme file not read, using defaults");
                return Self::default();
            }
        };
        match Self::from_toml_str(&contents) {
            Ok(theme) => theme,
            Err(err) => {
                tracing::warn!(path = %path_ref.display(), %err, "invalid theme file, using defaults");
                Self::default()
            }
        }
    }

    /// Colours missing from the file keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let cfg: ThemeToml = toml::from_str(s)?;
        let colors = cfg.colors;
        let base = Self::default();
        let pick = |value: Option<RgbToml>, fallback: Color| value.map_or(fallback, RgbToml::to_color);
        Ok(Self {
            title_bg: pick(colors.title_bg, base.title_bg),
            panel_bg: pick(colors.panel_bg, base.panel_bg),
            chat_bg: pick(colors.chat_bg, base.chat_bg),
            insight_bg: pick(colors.insight_bg, base.insight_bg),
            input_bg: pick(colors.input_bg, base.input_bg),
            status_bg: pick(colors.status_bg, base.status_bg),
            text_fg: pick(colors.text_fg, base.text_fg),
            muted_fg: pick(colors.muted_fg, base.muted_fg),
            active_fg: pick(colors.active_fg, base.active_fg),
            user_fg: pick(colors.user_fg, base.user_fg),
            assistant_fg: pick(colors.assistant_fg, base.assistant_fg),
            error_fg: pick(colors.error_fg, base.error_fg),
            success_fg: pick(colors.success_fg, base.success_fg),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ThemeToml {
    #[serde(default)]
    colors: ThemeColorsToml,
}

#[derive(Debug, Default, Deserialize)]
struct ThemeColorsToml {
    title_bg: Option<RgbToml>,
    panel_bg: Option<RgbToml>,
    chat_bg: Option<RgbToml>,
    insight_bg: Option<RgbToml>,
    input_bg: Option<RgbToml>,
    status_bg: Option<RgbToml>,
    text_fg: Option<RgbToml>,
    muted_fg: Option<RgbToml>,
    active_fg: Option<RgbToml>,
    user_fg: Option<RgbToml>,
    assistant_fg: Option<RgbToml>,
    error_fg: Option<RgbToml>,
    success_fg: Option<RgbToml>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RgbToml {
    r: u8,
    g: u8,
    b: u8,
}

impl RgbToml {
    fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}
