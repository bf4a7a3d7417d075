use crate::error::{FlakeError, Result};
use serde::{Deserialize, Deserializer};

/// 8-bit RGB triple
pub type Rgb = (u8, u8, u8);

pub const DEFAULT_YOUNG: Rgb = (0x2a, 0xb6, 0xe8); // Ice blue
pub const DEFAULT_OLD: Rgb = (0xc0, 0xc4, 0xcf); // Frost grey
pub const DEFAULT_BACKGROUND: Rgb = (0x28, 0x29, 0x23);

/// Configuration for a single crystal. Fixed for the crystal's lifetime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlakeConfig {
    /// Thickness every new node starts with
    pub thickness: f64,
    /// Growth budget every new node starts with
    pub growth: f64,
    /// Maximum number of branch events across the whole crystal
    pub max_branching: u32,
    /// Allow nodes to keep growing after leaving the simulated sector
    pub branch_crossing: bool,
    /// Color of a node with its full budget left
    #[serde(deserialize_with = "hex_color")]
    pub color_young: Rgb,
    /// Color of a node with no budget left
    #[serde(deserialize_with = "hex_color")]
    pub color_old: Rgb,
}

impl Default for FlakeConfig {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            growth: 20.0,
            max_branching: 9,
            branch_crossing: true,
            color_young: DEFAULT_YOUNG,
            color_old: DEFAULT_OLD,
        }
    }
}

/// Output raster configuration for rendered flakes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Edge of the square image in pixels
    pub size: u32,
    #[serde(deserialize_with = "hex_color")]
    pub background: Rgb,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            size: 700,
            background: DEFAULT_BACKGROUND,
        }
    }
}

/// Parse a `#rrggbb` (or `rrggbb`) color string.
pub fn parse_color(s: &str) -> Result<Rgb> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FlakeError::InvalidColor(s.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| FlakeError::InvalidColor(s.to_string()))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

fn hex_color<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Rgb, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_color(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_with_and_without_hash() {
        assert_eq!(parse_color("#2ab6e8").unwrap(), (0x2a, 0xb6, 0xe8));
        assert_eq!(parse_color("C0C4CF").unwrap(), (0xc0, 0xc4, 0xcf));
    }

    #[test]
    fn parse_color_rejects_garbage() {
        assert!(matches!(parse_color("#12345"), Err(FlakeError::InvalidColor(_))));
        assert!(matches!(parse_color("#gg0000"), Err(FlakeError::InvalidColor(_))));
        assert!(matches!(parse_color(""), Err(FlakeError::InvalidColor(_))));
    }

    #[test]
    fn defaults_match_file_renderer() {
        let config = FlakeConfig::default();
        assert_eq!(config.growth, 20.0);
        assert_eq!(config.max_branching, 9);
        assert!(config.branch_crossing);
        assert_eq!(ImageConfig::default().size, 700);
    }

    #[test]
    fn deserialize_fills_missing_fields_with_defaults() {
        let config: FlakeConfig = toml::from_str("growth = 12.0\ncolor_old = \"#000000\"").unwrap();
        assert_eq!(config.growth, 12.0);
        assert_eq!(config.color_old, (0, 0, 0));
        assert_eq!(config.color_young, DEFAULT_YOUNG);
        assert_eq!(config.max_branching, 9);

        let image: ImageConfig = toml::from_str("size = 128").unwrap();
        assert_eq!(image, ImageConfig { size: 128, background: DEFAULT_BACKGROUND });
    }

    #[test]
    fn deserialize_rejects_bad_color() {
        assert!(toml::from_str::<ImageConfig>("background = \"teal\"").is_err());
    }
}
