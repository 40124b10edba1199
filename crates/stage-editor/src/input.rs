//! Pointer input normalization.
//!
//! Converts page coordinates reported by the host into stage coordinates
//! (origin at the centre, y-up), relative to the canvas bounding rectangle.

use crate::events::BoundRect;
use kurbo::Point;
use stage_core::StageConfig;

/// Document scroll offset at the time of the event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub left: f64,
    pub top: f64,
}

/// Round to `precision` decimal places.
fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
    if !factor.is_finite() {
        return value;
    }
    (value * factor).round() / factor
}

/// Page position → stage position.
///
/// A degenerate bounding rectangle (zero width or height) maps everything to
/// the origin.
pub fn page_to_stage(
    page_x: f64,
    page_y: f64,
    rect: &BoundRect,
    scroll: ScrollOffset,
    config: &StageConfig,
) -> Point {
    if rect.width == 0.0 || rect.height == 0.0 {
        return Point::ZERO;
    }
    let nx = (page_x - rect.left - scroll.left) / rect.width - 0.5;
    let ny = (page_y - rect.top - scroll.top) / rect.height - 0.5;
    Point::new(
        round_to(nx * config.stage_width, config.pointer_precision),
        round_to(ny * -config.stage_height, config.pointer_precision),
    )
}
