//! Selection handle data.
//!
//! The handle is the on-canvas widget bound to the current selection. It
//! lives in display space (y pointing down) and is never persisted.

use serde::{Deserialize, Serialize};

/// Which affordances the handle offers for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub rotatable: bool,
    pub direction_toggle: bool,
    pub resizable: bool,
    pub centerable: bool,
    pub draggable: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        rotatable: false,
        direction_toggle: false,
        resizable: false,
        centerable: false,
        draggable: false,
    };

    pub const ALL: Self = Self {
        rotatable: true,
        direction_toggle: true,
        resizable: true,
        centerable: true,
        draggable: true,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Handle {
    /// Centre of the handle box.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Pivot offset from the centre, in display units before rotation.
    pub reg_x: f64,
    pub reg_y: f64,
    pub rotation: f64,
    pub direction: f64,
    pub capabilities: Capabilities,
    pub visible: bool,
}

impl Handle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pivot position in display space, with the handle rotation applied.
    pub fn pivot(&self) -> (f64, f64) {
        let theta = self.rotation.to_radians();
        let (sin, cos) = theta.sin_cos();
        (
            self.x + self.reg_x * cos - self.reg_y * sin,
            self.y + self.reg_x * sin + self.reg_y * cos,
        )
    }
}
