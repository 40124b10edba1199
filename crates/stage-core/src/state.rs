//! Stage-wide modes consulted by every component.

use serde::{Deserialize, Serialize};

/// Whether the stage draws at all. `Invisible` runs headless: no repaint,
/// no handle sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StageMode {
    #[default]
    Visual,
    Invisible,
}

/// Run state of the program driving the entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
}

impl EngineState {
    /// Selection and handle editing are only allowed while stopped.
    pub fn is_stopped(self) -> bool {
        self == EngineState::Stopped
    }
}
