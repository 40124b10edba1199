//! Keyboard nudge mapping.
//!
//! Arrow keys move the selected entity by a fixed distance; holding Shift
//! switches to the fine distance. Keys are `KeyboardEvent.key` values.

use stage_core::StageConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDirection {
    /// Unit step in stage space (y-up).
    pub fn delta(self) -> (f64, f64) {
        match self {
            MoveDirection::Up => (0.0, 1.0),
            MoveDirection::Down => (0.0, -1.0),
            MoveDirection::Left => (-1.0, 0.0),
            MoveDirection::Right => (1.0, 0.0),
        }
    }
}

/// A resolved nudge: where and how far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nudge {
    pub direction: MoveDirection,
    pub distance: f64,
}

pub struct NudgeMap;

impl NudgeMap {
    /// Resolve a key to a nudge. Returns `None` for unbound keys.
    pub fn resolve(key: &str, shift: bool, config: &StageConfig) -> Option<Nudge> {
        let direction = match key {
            "ArrowUp" | "Up" => MoveDirection::Up,
            "ArrowDown" | "Down" => MoveDirection::Down,
            "ArrowLeft" | "Left" => MoveDirection::Left,
            "ArrowRight" | "Right" => MoveDirection::Right,
            _ => return None,
        };
        let distance = if shift {
            config.fine_nudge_distance
        } else {
            config.nudge_distance
        };
        Some(Nudge {
            direction,
            distance,
        })
    }
}
