//! Tunable behavior shared by both product variants.

use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Duration;

/// Base grid unit in canvas units. One tile spans four of them.
pub const GRID_UNIT: u32 = 64;

/// Default tile size.
pub const TILE_SIZE: u32 = GRID_UNIT * 4;

/// How committed strokes get erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraseMode {
    /// Scribbling over a stroke erases everything under the scribble.
    #[default]
    Lasso,
    /// Pressing and holding on a stroke deletes it.
    Hold,
}

/// Axis the momentum scroller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAxis {
    #[default]
    Horizontal,
    Vertical,
}

/// Configuration of a sketch session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub erase_mode: EraseMode,
    /// Crossings against a single stroke that turn a stroke into a lasso.
    pub intersection_threshold: usize,
    pub hold_duration_ms: u64,
    /// Width of the invisible hold-erase hit region.
    pub hold_hit_width: f64,
    /// Per-tick velocity multiplier, in `(0, 1)`.
    pub momentum_decay: f64,
    pub sensitivity: f64,
    pub scroll_axis: ScrollAxis,
    pub tile_size: u32,
    /// Distance from a canvas edge at which the viewport counts as near it.
    pub edge_margin: f64,
    pub edge_debounce_ms: u64,
    pub save_debounce_ms: u64,
    /// Strokes shorter than this are left out of exports.
    pub noise_length_threshold: Option<f64>,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self::lasso()
    }
}

impl SketchConfig {
    /// Scribble-to-erase variant.
    pub fn lasso() -> Self {
        Self {
            erase_mode: EraseMode::Lasso,
            intersection_threshold: 8,
            hold_duration_ms: 500,
            hold_hit_width: 24.0,
            momentum_decay: 0.95,
            sensitivity: 0.05,
            scroll_axis: ScrollAxis::Horizontal,
            tile_size: TILE_SIZE,
            edge_margin: GRID_UNIT as f64,
            edge_debounce_ms: 500,
            save_debounce_ms: 1000,
            noise_length_threshold: None,
        }
    }

    /// Press-and-hold-to-erase variant.
    pub fn hold() -> Self {
        Self {
            erase_mode: EraseMode::Hold,
            momentum_decay: 0.9,
            sensitivity: 0.08,
            noise_length_threshold: Some(4.0),
            ..Self::lasso()
        }
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_duration_ms)
    }

    pub fn edge_debounce(&self) -> Duration {
        Duration::from_millis(self.edge_debounce_ms)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Parse a config, filling missing fields from the lasso preset.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Force values into their valid ranges.
    pub fn sanitized(mut self) -> Self {
        self.tile_size = self.tile_size.max(1);
        if !(self.momentum_decay > 0.0 && self.momentum_decay < 1.0) {
            log::warn!("momentum_decay {} out of range, using default", self.momentum_decay);
            self.momentum_decay = Self::lasso().momentum_decay;
        }
        self.intersection_threshold = self.intersection_threshold.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_only_where_expected() {
        let lasso = SketchConfig::lasso();
        let hold = SketchConfig::hold();
        assert_eq!(lasso.erase_mode, EraseMode::Lasso);
        assert_eq!(hold.erase_mode, EraseMode::Hold);
        assert_eq!(lasso.tile_size, hold.tile_size);
        assert_eq!(lasso.tile_size, 4 * GRID_UNIT);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SketchConfig::from_json(r#"{"erase_mode":"hold","tile_size":128}"#).unwrap();
        assert_eq!(config.erase_mode, EraseMode::Hold);
        assert_eq!(config.tile_size, 128);
        assert_eq!(config.intersection_threshold, 8);
    }

    #[test]
    fn test_sanitize_rejects_bad_decay() {
        let config = SketchConfig::from_json(r#"{"momentum_decay":1.5,"tile_size":0}"#).unwrap();
        assert!(config.momentum_decay < 1.0);
        assert_eq!(config.tile_size, 1);
    }
}
