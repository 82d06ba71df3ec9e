//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark values (onedark.theme), used when a key is missing.
mod onedark {
    use ratatui::style::Color;

    pub const GREEN: Color = Color::Rgb(0x98, 0xC3, 0x79);
    pub const YELLOW: Color = Color::Rgb(0xE5, 0xC0, 0x7B);
    pub const RED: Color = Color::Rgb(0xE0, 0x6C, 0x75);
    pub const BLUE: Color = Color::Rgb(0x61, 0xAF, 0xEF);
    pub const MAGENTA: Color = Color::Rgb(0xC6, 0x78, 0xDD);
    pub const METER_BG: Color = Color::Rgb(0x31, 0x35, 0x3F);
    pub const DIV_LINE: Color = Color::Rgb(0x3F, 0x44, 0x4F);
    pub const MAIN_FG: Color = Color::Rgb(0xAB, 0xB2, 0xBF);
    pub const INACTIVE_FG: Color = Color::Rgb(0x5C, 0x63, 0x70);
}

/// Colours for lanes, words and the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub bg: Color,
    /// Lane borders.
    pub div_line: Color,
    /// Untyped words.
    pub main_fg: Color,
    pub title: Color,
    /// Finished words in the active row.
    pub inactive_fg: Color,
    /// Correctly typed characters.
    pub typed: Color,
    /// Active word highlight.
    pub target: Color,
    /// Mistakes, overflow, "capped out".
    pub error: Color,
    /// Rows above the initial height.
    pub penalty: Color,
    /// AI lane accent.
    pub opponent: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    pub fn onedark_default() -> Self {
        Self {
            bg: onedark::METER_BG,
            div_line: onedark::DIV_LINE,
            main_fg: onedark::MAIN_FG,
            title: onedark::YELLOW,
            inactive_fg: onedark::INACTIVE_FG,
            typed: onedark::GREEN,
            target: onedark::YELLOW,
            error: onedark::RED,
            penalty: onedark::MAGENTA,
            opponent: onedark::BLUE,
        }
    }

    /// Load theme from a btop-style file; missing path means One Dark.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?))
            }
            _ => Self::default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override the signal colours (typed / error / penalty) for accessibility.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.typed = Color::Rgb(0x00, 0xFF, 0x00);
                self.target = Color::Rgb(0xFF, 0xFF, 0x00);
                self.error = Color::Rgb(0xFF, 0x00, 0x00);
                self.penalty = Color::Rgb(0xFF, 0x00, 0xFF);
                self.opponent = Color::Rgb(0x00, 0x88, 0xFF);
                self.main_fg = Color::White;
            }
            Palette::Colorblind => {
                // Blue/orange instead of green/red.
                self.typed = Color::Rgb(0x00, 0x77, 0xBB);
                self.target = Color::Rgb(0xBB, 0xBB, 0x00);
                self.error = Color::Rgb(0xEE, 0x77, 0x33);
                self.penalty = Color::Rgb(0xEE, 0x33, 0x77);
                self.opponent = Color::Rgb(0x00, 0x99, 0x88);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|k| map.get(*k).and_then(|v| parse_hex(v).ok()))
                .unwrap_or(fallback)
        };
        Self {
            bg: get(&["meter_bg"], onedark::METER_BG),
            div_line: get(&["div_line"], onedark::DIV_LINE),
            main_fg: get(&["main_fg"], onedark::MAIN_FG),
            title: get(&["title"], onedark::YELLOW),
            inactive_fg: get(&["inactive_fg"], onedark::INACTIVE_FG),
            typed: get(&["mem_box", "cpu_start"], onedark::GREEN),
            target: get(&["hi_fg", "cpu_mid"], onedark::YELLOW),
            error: get(&["cpu_end", "temp_end"], onedark::RED),
            penalty: get(&["net_box"], onedark::MAGENTA),
            opponent: get(&["cpu_box"], onedark::BLUE),
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let rest = l.strip_prefix("theme[")?;
            let (key, rest) = rest.split_once(']')?;
            let (_, value) = rest.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(bad)
    };
    match s.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(bad()),
    }
}
