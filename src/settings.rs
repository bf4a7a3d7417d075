use crate::config::{parse_color, FlakeConfig, ImageConfig};
use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Contents of `config.toml`. Every field is optional; missing values fall
/// back to the built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub snowflake: SnowflakeSettings,
    pub image: ImageSettings,
    pub replay: ReplaySettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct SnowflakeSettings {
    pub thickness: Option<f64>,
    pub growth: Option<f64>,
    pub max_branching: Option<u32>,
    pub branch_crossing: Option<bool>,
    pub color_young: Option<String>,  // "#rrggbb"
    pub color_old: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageSettings {
    pub size: Option<u32>,
    pub background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReplaySettings {
    pub dt: Option<f64>,
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read settings from `path`. A missing or unparsable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flakemaker")
            .join("config.toml")
    }

    pub fn flake_config(&self) -> Result<FlakeConfig> {
        let defaults = FlakeConfig::default();
        let s = &self.snowflake;
        Ok(FlakeConfig {
            thickness: s.thickness.unwrap_or(defaults.thickness),
            growth: s.growth.unwrap_or(defaults.growth),
            max_branching: s.max_branching.unwrap_or(defaults.max_branching),
            branch_crossing: s.branch_crossing.unwrap_or(defaults.branch_crossing),
            color_young: s.color_young.as_deref().map(parse_color).transpose()?.unwrap_or(defaults.color_young),
            color_old: s.color_old.as_deref().map(parse_color).transpose()?.unwrap_or(defaults.color_old),
        })
    }

    pub fn image_config(&self) -> Result<ImageConfig> {
        let defaults = ImageConfig::default();
        Ok(ImageConfig {
            size: self.image.size.unwrap_or(defaults.size),
            background: self.image.background.as_deref().map(parse_color).transpose()?.unwrap_or(defaults.background),
        })
    }

    pub fn dt(&self) -> f64 {
        self.replay.dt.unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlakeError;

    #[test]
    fn empty_file_gives_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.flake_config().unwrap(), FlakeConfig::default());
        assert_eq!(settings.image_config().unwrap(), ImageConfig::default());
        assert_eq!(settings.dt(), 1.0);
    }

    #[test]
    fn partial_sections_override_only_what_they_name() {
        let settings: Settings = toml::from_str(
            r##"
            [snowflake]
            growth = 12.5
            branch_crossing = false
            color_old = "#000000"

            [image]
            size = 256

            [replay]
            dt = 0.5
            "##,
        )
        .unwrap();

        let flake = settings.flake_config().unwrap();
        assert_eq!(flake.growth, 12.5);
        assert!(!flake.branch_crossing);
        assert_eq!(flake.color_old, (0, 0, 0));
        assert_eq!(flake.max_branching, FlakeConfig::default().max_branching);
        assert_eq!(settings.image_config().unwrap().size, 256);
        assert_eq!(settings.dt(), 0.5);
    }

    #[test]
    fn bad_color_is_an_error() {
        let settings: Settings = toml::from_str("[image]\nbackground = \"teal\"").unwrap();
        assert!(matches!(settings.image_config(), Err(FlakeError::InvalidColor(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/flakemaker/config.toml"));
        assert!(settings.snowflake.growth.is_none());
    }

    #[test]
    fn config_path_ends_with_app_dir() {
        assert!(Settings::config_path().ends_with("flakemaker/config.toml"));
    }
}
