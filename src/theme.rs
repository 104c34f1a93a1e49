//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::tile::Tile;
use clap::ValueEnum;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile colours in `Tile::SPAWNABLE` order: ship, laser, enemy laser,
    /// enemy, three asteroids, bomb.
    pub tiles: [Color; 8],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, chain).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Hints and secondary text.
    pub inactive_fg: Color,
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

/// Theme keys tried per tile (first hit wins), with the One Dark fallback.
const TILE_KEYS: [(&[&str], Color); 8] = [
    (&["hi_fg", "proc_misc"], Color::Rgb(0x56, 0xB6, 0xC2)),
    (&["mem_box", "cpu_start"], Color::Rgb(0x98, 0xC3, 0x79)),
    (&["cpu_end", "temp_end"], Color::Rgb(0xE0, 0x6C, 0x75)),
    (&["net_box"], Color::Rgb(0xC6, 0x78, 0xDD)),
    (&["main_fg"], Color::Rgb(0xAB, 0xB2, 0xBF)),
    (&["temp_mid", "cpu_mid"], Color::Rgb(0xD1, 0x9A, 0x66)),
    (&["inactive_fg"], Color::Rgb(0x7F, 0x84, 0x8E)),
    (&["title"], Color::Rgb(0xE5, 0xC0, 0x7B)),
];

impl Theme {
    /// Hardcoded One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            tiles: TILE_KEYS.map(|(_, fallback)| fallback),
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn default_for_palette(palette: Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.tiles = [
                    Color::Rgb(0x00, 0xFF, 0xFF), // ship: cyan
                    Color::Rgb(0x00, 0xFF, 0x00), // laser: green
                    Color::Rgb(0xFF, 0x00, 0x00), // enemy laser: red
                    Color::Rgb(0xFF, 0x00, 0xFF), // enemy: magenta
                    Color::Rgb(0xFF, 0xFF, 0xFF),
                    Color::Rgb(0xFF, 0x88, 0x00),
                    Color::Rgb(0x88, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00), // bomb: yellow
                ];
            }
            Palette::Colorblind => {
                // Player side blue, enemy side orange; never red against green.
                self.tiles = [
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0x33, 0xBB, 0xEE),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0xCC, 0x33, 0x11),
                    Color::Rgb(0xBB, 0xBB, 0xBB),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0xBB, 0xBB, 0x00),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let defaults = Self::onedark_default();
        Self {
            tiles: TILE_KEYS.map(|(keys, fallback)| {
                keys.iter().find_map(|k| get(k)).unwrap_or(fallback)
            }),
            bg: get("meter_bg").unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
        }
    }

    /// Colour for a tile; `Empty` takes the background.
    #[inline]
    pub fn tile_color(&self, tile: Tile) -> Color {
        tile.palette_index().map_or(self.bg, |i| self.tiles[i])
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_tile_colours_from_file_keys() {
        let map = parse_theme_file(
            r##"
            # comment
            theme[hi_fg]="#010203"
            theme[temp_mid]='#0A0B0C'
            "##,
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.tile_color(Tile::Ship), Color::Rgb(1, 2, 3));
        assert_eq!(theme.tile_color(Tile::Asteroid2), Color::Rgb(10, 11, 12));
        assert_eq!(theme.tile_color(Tile::Bomb), Theme::default().tiles[7]);
        assert_eq!(theme.tile_color(Tile::Empty), theme.bg);
    }

    #[test]
    fn test_missing_file_falls_back_to_palette() {
        let theme = Theme::load(Some(Path::new("/nonexistent/x.theme")), Palette::HighContrast)
            .unwrap();
        assert_eq!(theme.tile_color(Tile::Bomb), Color::Rgb(0xFF, 0xFF, 0x00));
    }
}
