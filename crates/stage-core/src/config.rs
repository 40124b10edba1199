//! Stage configuration.

use serde::{Deserialize, Serialize};

/// Geometry and pacing of the stage.
///
/// Every field has a default, so a partial JSON document only overrides what
/// it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Logical stage size in stage units. The origin is the centre.
    pub stage_width: f64,
    pub stage_height: f64,

    /// Canvas size in pixels. The stage is scaled to fit the width.
    pub canvas_width: f64,
    pub canvas_height: f64,

    /// Nominal redraw cadence.
    pub frame_interval_ms: u64,

    /// Root child index at which the active object container is attached,
    /// between the variable layer and the dialog layer.
    pub container_index: usize,

    /// Keyboard nudge distances, in stage units.
    pub nudge_distance: f64,
    pub fine_nudge_distance: f64,

    /// Decimal places kept when converting pointer positions.
    pub pointer_precision: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            stage_width: 480.0,
            stage_height: 270.0,
            canvas_width: 640.0,
            canvas_height: 360.0,
            frame_interval_ms: 16,
            container_index: 2,
            nudge_distance: 5.0,
            fine_nudge_distance: 1.0,
            pointer_precision: 2,
        }
    }
}

impl StageConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// Returns a description of the problem when the JSON is malformed or a
    /// field has the wrong type.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| format!("invalid stage config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the scheduler and coordinate maths cannot use.
    ///
    /// # Errors
    /// Returns the name of the offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_interval_ms == 0 {
            return Err("frame_interval_ms must be positive".to_string());
        }
        if self.stage_width <= 0.0 || self.stage_height <= 0.0 {
            return Err("stage size must be positive".to_string());
        }
        if self.canvas_width <= 0.0 || self.canvas_height <= 0.0 {
            return Err("canvas size must be positive".to_string());
        }
        Ok(())
    }

    /// Pixels per stage unit.
    pub fn canvas_scale(&self) -> f64 {
        self.canvas_width / self.stage_width
    }
}
