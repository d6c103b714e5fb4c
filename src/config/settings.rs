//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::geometry::GridClipper;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Silkscreen settings.
    #[serde(default)]
    pub silkscreen: SilkscreenConfig,

    /// Courtyard settings.
    #[serde(default)]
    pub courtyard: CourtyardConfig,

    /// Fabrication layer settings.
    #[serde(default)]
    pub fabrication: FabricationConfig,

    /// Polygon clipping settings.
    #[serde(default)]
    pub clipping: ClippingConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let widths = [
            ("silkscreen.line_width", self.silkscreen.line_width),
            ("courtyard.line_width", self.courtyard.line_width),
            ("fabrication.line_width", self.fabrication.line_width),
        ];
        for (name, width) in widths {
            if !(width > 0.0 && width.is_finite()) {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} must be a positive number, got {width}"),
                });
            }
        }

        if !(self.silkscreen.pad_clearance >= 0.0 && self.silkscreen.pad_clearance.is_finite()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "silkscreen.pad_clearance must not be negative, got {}",
                    self.silkscreen.pad_clearance
                ),
            });
        }

        if !(self.silkscreen.gap_factor >= 0.0 && self.silkscreen.gap_factor.is_finite()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "silkscreen.gap_factor must not be negative, got {}",
                    self.silkscreen.gap_factor
                ),
            });
        }

        if !(self.clipping.scale >= 1.0 && self.clipping.scale.is_finite()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "clipping.scale must be at least 1 grid unit per mm, got {}",
                    self.clipping.scale
                ),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ),
            });
        }
        Ok(())
    }

    /// Clipper for the configured grid scale.
    #[must_use]
    pub const fn clipper(&self) -> GridClipper {
        GridClipper::new(self.clipping.scale)
    }
}

/// Silkscreen configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SilkscreenConfig {
    /// Silkscreen line width in mm.
    #[serde(default = "default_silkscreen_width")]
    pub line_width: f64,

    /// Distance between the edge of a silkscreen line and copper in mm.
    #[serde(default = "default_pad_clearance")]
    pub pad_clearance: f64,

    /// Length of the pin 1 gap in line widths.
    #[serde(default = "default_gap_factor")]
    pub gap_factor: f64,
}

impl Default for SilkscreenConfig {
    fn default() -> Self {
        Self {
            line_width: default_silkscreen_width(),
            pad_clearance: default_pad_clearance(),
            gap_factor: default_gap_factor(),
        }
    }
}

const fn default_silkscreen_width() -> f64 {
    0.15
}

const fn default_pad_clearance() -> f64 {
    0.1
}

const fn default_gap_factor() -> f64 {
    4.0
}

/// Courtyard configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourtyardConfig {
    /// Courtyard line width in mm.
    #[serde(default = "default_courtyard_width")]
    pub line_width: f64,
}

impl Default for CourtyardConfig {
    fn default() -> Self {
        Self {
            line_width: default_courtyard_width(),
        }
    }
}

const fn default_courtyard_width() -> f64 {
    0.05
}

/// Fabrication layer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FabricationConfig {
    /// Fabrication line width in mm.
    #[serde(default = "default_fabrication_width")]
    pub line_width: f64,
}

impl Default for FabricationConfig {
    fn default() -> Self {
        Self {
            line_width: default_fabrication_width(),
        }
    }
}

const fn default_fabrication_width() -> f64 {
    0.15
}

/// Polygon clipping configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClippingConfig {
    /// Grid units per mm.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for ClippingConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
        }
    }
}

const fn default_scale() -> f64 {
    GridClipper::DEFAULT_SCALE
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert!((config.silkscreen.line_width - 0.15).abs() < f64::EPSILON);
        assert!((config.clipping.scale - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "silkscreen": {
                "line_width": 0.12,
                "pad_clearance": 0.2,
                "gap_factor": 3
            },
            "courtyard": { "line_width": 0.05 },
            "fabrication": { "line_width": 0.1 },
            "clipping": { "scale": 10000 },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert!((config.silkscreen.line_width - 0.12).abs() < f64::EPSILON);
        assert!((config.silkscreen.pad_clearance - 0.2).abs() < f64::EPSILON);
        assert!((config.silkscreen.gap_factor - 3.0).abs() < f64::EPSILON);
        assert!((config.fabrication.line_width - 0.1).abs() < f64::EPSILON);
        assert!((config.clipper().scale() - 10000.0).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn section_defaults() {
        let silkscreen = SilkscreenConfig::default();
        assert!((silkscreen.pad_clearance - 0.1).abs() < f64::EPSILON);
        assert!((silkscreen.gap_factor - 4.0).abs() < f64::EPSILON);
        assert!((CourtyardConfig::default().line_width - 0.05).abs() < f64::EPSILON);
        assert!((FabricationConfig::default().line_width - 0.15).abs() < f64::EPSILON);
        assert_eq!(LoggingConfig::default().level, "warn");
    }

    #[test]
    fn reject_non_positive_width() {
        let json = r#"{ "courtyard": { "line_width": 0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_coarse_scale() {
        let json = r#"{ "clipping": { "scale": 0.5 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_invalid_log_level() {
        let json = r#"{ "logging": { "level": "loud" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
