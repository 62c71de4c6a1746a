//! Editor tunables.

use crate::elements::SerializableColor;
use crate::viewport::{MAX_SCALE, MIN_SCALE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading an editor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for this schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is outside its valid range.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: &'static str, value: String },
}

/// Thresholds, sizes and colors used by the gesture engine and renderer.
///
/// Screen-space values are in pixels and are divided by the viewport scale
/// before comparing against canvas geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Per-axis displacement (px) below which a release counts as a tap.
    pub tap_distance: f64,
    /// Press duration (ms) below which a release counts as a tap.
    pub tap_duration_ms: u64,
    /// Displacement (px) that turns a press on an element into a move.
    pub move_threshold: f64,
    pub handle_radius: f64,
    pub handle_hit_radius: f64,
    pub element_hit_threshold: f64,
    /// Shorter draws (canvas units) are discarded.
    pub min_draw_distance: f64,
    pub grid_size: f64,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    pub label_font_size: f64,
    pub label_color: SerializableColor,
    pub selection_color: SerializableColor,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            tap_distance: 10.0,
            tap_duration_ms: 300,
            move_threshold: 5.0,
            handle_radius: crate::selection::HANDLE_RADIUS,
            handle_hit_radius: crate::selection::HANDLE_HIT_RADIUS,
            element_hit_threshold: crate::selection::ELEMENT_HIT_THRESHOLD,
            min_draw_distance: 3.0,
            grid_size: 50.0,
            stroke_color: SerializableColor::ink(),
            stroke_width: 2.0,
            label_font_size: 14.0,
            label_color: SerializableColor::accent(),
            selection_color: SerializableColor::accent(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        log::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn tap_duration(&self) -> Duration {
        Duration::from_millis(self.tap_duration_ms)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::ValueOutOfRange {
                    key,
                    value: value.to_string(),
                })
            }
        }

        positive("min_scale", self.min_scale)?;
        positive("max_scale", self.max_scale)?;
        if self.min_scale > self.max_scale {
            return Err(ConfigError::ValueOutOfRange {
                key: "min_scale",
                value: format!("{} > max_scale {}", self.min_scale, self.max_scale),
            });
        }
        positive("handle_radius", self.handle_radius)?;
        positive("handle_hit_radius", self.handle_hit_radius)?;
        positive("grid_size", self.grid_size)?;
        positive("stroke_width", self.stroke_width)?;
        positive("label_font_size", self.label_font_size)?;
        for (key, value) in [
            ("tap_distance", self.tap_distance),
            ("move_threshold", self.move_threshold),
            ("element_hit_threshold", self.element_hit_threshold),
            ("min_draw_distance", self.min_draw_distance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValueOutOfRange {
                    key,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
