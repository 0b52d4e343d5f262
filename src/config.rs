//! Configuration loader for Palettone.
//!
//! * Looks for `palettone.toml` in the cwd unless overridden by `--config`.
//! * Provides defaults so the file is optional.
//!
//! Extend this struct whenever you add new tunables.

use serde::Deserialize;
use std::fs;

use crate::palette::PaletteParams;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Hue spread (degrees) for the four main palette colors.
    #[serde(default = "default_main_hue_range")]
    pub main_hue_range: f32,
    /// Hue spread (degrees) for the accent color.
    #[serde(default = "default_accent_hue_range")]
    pub accent_hue_range: f32,
    /// Saturation center (percent) before the family transform.
    #[serde(default = "default_base_saturation")]
    pub base_saturation: f32,
    /// Lightness center (percent) before the family transform.
    #[serde(default = "default_base_lightness")]
    pub base_lightness: f32,
    /// Master audio volume (0.0 to 1.0).
    #[serde(default = "default_volume")]
    pub audio_volume: f32,
    /// Random seed for reproducible palettes (optional).
    pub seed: Option<u64>,
}

fn default_main_hue_range() -> f32 {
    30.0
}
fn default_accent_hue_range() -> f32 {
    60.0
}
fn default_base_saturation() -> f32 {
    70.0
}
fn default_base_lightness() -> f32 {
    50.0
}
fn default_volume() -> f32 {
    0.7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            main_hue_range: default_main_hue_range(),
            accent_hue_range: default_accent_hue_range(),
            base_saturation: default_base_saturation(),
            base_lightness: default_base_lightness(),
            audio_volume: default_volume(),
            seed: None,
        }
    }
}

impl Config {
    /// Load from a TOML file; fall back to defaults on any error.
    pub fn load(path: Option<&str>) -> Self {
        let p = path.unwrap_or("palettone.toml");
        match fs::read_to_string(p) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring malformed {p}: {e}");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn params(&self) -> PaletteParams {
        PaletteParams {
            main_hue_range: self.main_hue_range,
            accent_hue_range: self.accent_hue_range,
            base_saturation: self.base_saturation,
            base_lightness: self.base_lightness,
        }
    }
}

// ---------- tests ----------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_ranges() {
        let c = Config::default();
        assert_eq!(c.main_hue_range, 30.0);
        assert_eq!(c.accent_hue_range, 60.0);
        assert_eq!(c.base_saturation, 70.0);
        assert_eq!(c.base_lightness, 50.0);
        assert_eq!(c.audio_volume, 0.7);
        assert_eq!(c.seed, None);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let c: Config = toml::from_str("main_hue_range = 45.0\nseed = 7\n").unwrap();
        assert_eq!(c.main_hue_range, 45.0);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.base_saturation, 70.0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let c = Config::load(Some("/nonexistent/palettone.toml"));
        assert_eq!(c, Config::default());
    }

    #[test]
    fn params_mirror_the_config() {
        let c = Config {
            main_hue_range: 10.0,
            ..Config::default()
        };
        let p = c.params();
        assert_eq!(p.main_hue_range, 10.0);
        assert_eq!(p.base_lightness, c.base_lightness);
    }
}
