//! Renderer seam.
//!
//! The stage never draws by itself: it hands a borrowed view of its state to
//! a `Renderer` when the scheduler decides a repaint is owed.

use crate::hit;
use kurbo::Point;
use stage_core::{DisplayTree, EntityStore, EntityTransform, Handle, StageConfig};

/// Everything a renderer may read to paint one frame.
#[derive(Clone, Copy)]
pub struct RenderView<'a> {
    pub display: &'a DisplayTree,
    pub entities: &'a EntityStore,
    pub handle: &'a Handle,
    pub config: &'a StageConfig,
    /// A text-entry overlay is shown on top of the stage.
    pub overlay_visible: bool,
}

pub trait Renderer {
    /// Repaint the whole stage.
    fn render(&mut self, view: &RenderView<'_>);

    /// Refresh only the handle widget after it moved.
    fn render_handle(&mut self, _handle: &Handle) {}

    /// Whether `point` (stage space, y-up) falls inside the rendered bounds
    /// of an entity.
    fn hit_test(&self, transform: &EntityTransform, point: Point) -> bool {
        hit::entity_contains(transform, point)
    }
}
