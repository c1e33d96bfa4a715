//! Particle field configuration
//!
//! Every tunable constant of the field lives here. Two presets match the two
//! generations of the portfolio site; JSON configs fill missing fields from
//! the default preset.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::surface::Rgb;
use crate::theme::colors;

/// Named configurations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Dense teal field of the first site generation
    Classic,
    /// Sparse, faint field of the current site
    #[default]
    Ambient,
}

impl Preset {
    pub const ALL: &'static [Preset] = &[Preset::Classic, Preset::Ambient];

    pub fn config(self) -> FieldConfig {
        match self {
            Preset::Classic => FieldConfig {
                max_particles: 100,
                density_divisor: 10.0,
                connection_distance: 150.0,
                max_speed: 0.25,
                radius: [1.0, 3.0],
                opacity: [0.6, 0.6],
                link_opacity: 1.0,
                link_width: 0.3,
                color: colors::TEAL,
            },
            Preset::Ambient => FieldConfig {
                max_particles: 60,
                density_divisor: 25.0,
                connection_distance: 120.0,
                max_speed: 0.2,
                radius: [0.5, 2.0],
                opacity: [0.2, 0.7],
                link_opacity: 0.15,
                link_width: 0.5,
                color: colors::CYBER_CYAN,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Ambient => "ambient",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(name.trim()))
    }
}

/// Tunables of the particle field
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Upper bound on particle count
    pub max_particles: usize,
    /// Viewport pixels of width per particle
    pub density_divisor: f32,
    /// Pairs closer than this are joined by a line
    pub connection_distance: f32,
    /// Velocity components are sampled in [-max_speed, max_speed]
    pub max_speed: f32,
    /// [min, max] radius
    pub radius: [f32; 2],
    /// [min, max] particle opacity
    pub opacity: [f32; 2],
    /// Line opacity at zero distance
    pub link_opacity: f32,
    pub link_width: f32,
    #[serde(with = "hex_color")]
    pub color: Rgb,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Preset::default().config()
    }
}

impl FieldConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FieldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(field: &'static str, ok: bool) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange(field))
            }
        }

        let [r_min, r_max] = self.radius;
        let [o_min, o_max] = self.opacity;

        check(
            "density_divisor",
            self.density_divisor.is_finite() && self.density_divisor > 0.0,
        )?;
        check(
            "connection_distance",
            self.connection_distance.is_finite() && self.connection_distance > 0.0,
        )?;
        // Velocity range spans 2 * max_speed, which must stay finite
        check(
            "max_speed",
            self.max_speed.is_finite() && self.max_speed >= 0.0 && self.max_speed <= f32::MAX / 2.0,
        )?;
        check("radius", r_min.is_finite() && r_max.is_finite() && r_min > 0.0 && r_min <= r_max)?;
        check("opacity", o_min > 0.0 && o_min <= o_max && o_max <= 1.0)?;
        check("link_opacity", (0.0..=1.0).contains(&self.link_opacity))?;
        check("link_width", self.link_width.is_finite() && self.link_width > 0.0)?;
        Ok(())
    }
}

/// Rejected configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Malformed JSON or wrong field types
    Json(serde_json::Error),
    /// Color string is not `#rrggbb`
    InvalidColor(String),
    /// Named field holds a value outside its allowed range
    OutOfRange(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Invalid field config JSON: {}", e),
            ConfigError::InvalidColor(s) => write!(f, "Invalid color '{}', expected #rrggbb", s),
            ConfigError::OutOfRange(field) => write!(f, "Config field '{}' is out of range", field),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// `#rrggbb` (de)serialization for [`Rgb`]
mod hex_color {
    use super::{ConfigError, Rgb};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Rgb, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(color)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Rgb, D::Error> {
        let raw = String::deserialize(d)?;
        Rgb::from_hex(&raw).ok_or_else(|| de::Error::custom(ConfigError::InvalidColor(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for preset in Preset::ALL {
            assert!(preset.config().validate().is_ok(), "{:?}", preset);
        }
    }

    #[test]
    fn test_default_is_ambient() {
        let config = FieldConfig::default();
        assert_eq!(config.max_particles, 60);
        assert_eq!(config.density_divisor, 25.0);
    }

    #[test]
    fn test_preset_from_name() {
        assert_eq!(Preset::from_name("Classic"), Some(Preset::Classic));
        assert_eq!(Preset::from_name(" ambient "), Some(Preset::Ambient));
        assert_eq!(Preset::from_name("blockchain"), None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = FieldConfig::from_json(r##"{"max_particles": 12, "color": "#ff0000"}"##).unwrap();
        assert_eq!(config.max_particles, 12);
        assert_eq!(config.color, Rgb::new(255, 0, 0));
        assert_eq!(config.connection_distance, FieldConfig::default().connection_distance);
    }

    #[test]
    fn test_json_roundtrip_keeps_hex() {
        let json = serde_json::to_string(&Preset::Classic.config()).unwrap();
        assert!(json.contains(r##""color":"#64ffda""##));
    }

    #[test]
    fn test_rejects_bad_color() {
        let err = FieldConfig::from_json(r#"{"color": "teal"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("teal"));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let cases = [
            r#"{"density_divisor": 0}"#,
            r#"{"connection_distance": -1}"#,
            r#"{"max_speed": -0.1}"#,
            r#"{"max_speed": 3e38}"#,
            r#"{"radius": [2.0, 1.0]}"#,
            r#"{"radius": [0.0, 1.0]}"#,
            r#"{"opacity": [0.5, 1.5]}"#,
            r#"{"link_opacity": 2.0}"#,
            r#"{"link_width": 0}"#,
        ];
        for json in cases {
            let err = FieldConfig::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigError::OutOfRange(_)), "{}", json);
        }
    }
}
