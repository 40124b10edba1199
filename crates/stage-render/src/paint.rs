//! Stage → Vello drawing commands.
//!
//! Walks the display tree root-first and emits Vello paint operations for
//! the background, the coordinate grid, entity outlines of the active
//! container and the selection handle. Sprite textures are the asset
//! loader's business; entities are painted as their transformed boxes.

use crate::hit::{display_bounds, entity_affine, local_bounds};
use crate::renderer::{RenderView, Renderer};
use kurbo::{Affine, Circle, Line, Point, Rect, Stroke};
use peniko::{Color, Fill};
use stage_core::{DisplayKind, EntityTransform, Handle, Layer, NodeIndex, StageConfig};
use vello::Scene;

const BACKGROUND: Color = Color::from_rgba8(255, 255, 255, 255);
const GRID: Color = Color::from_rgba8(0, 0, 0, 40);
const ENTITY_FILL: Color = Color::from_rgba8(90, 140, 220, 60);
const ENTITY_STROKE: Color = Color::from_rgba8(90, 140, 220, 255);
const HANDLE_STROKE: Color = Color::from_rgba8(32, 128, 255, 255);
const HANDLE_KNOB: Color = Color::from_rgba8(255, 255, 255, 255);
const DIRECTION: Color = Color::from_rgba8(255, 96, 0, 255);
const INPUT_OVERLAY: Color = Color::from_rgba8(245, 245, 245, 230);
const INPUT_OVERLAY_STROKE: Color = Color::from_rgba8(160, 160, 160, 255);

/// Distance between the handle box and its rotation knob, in pixels.
const KNOB_OFFSET: f64 = 20.0;
const KNOB_RADIUS: f64 = 5.0;
const GRID_STEP: f64 = 30.0;
/// Height and margin of the text-entry overlay, in stage units.
const INPUT_OVERLAY_HEIGHT: f64 = 32.0;
const INPUT_OVERLAY_MARGIN: f64 = 8.0;

/// Stage display space (origin at the centre, y-down) → canvas pixels.
pub fn view_transform(config: &StageConfig) -> Affine {
    Affine::translate((config.canvas_width / 2.0, config.canvas_height / 2.0))
        * Affine::scale(config.canvas_scale())
}

/// Paint the whole stage to a Vello scene.
///
/// Call once per frame with a freshly-cleared `Scene`.
pub fn paint_stage(scene: &mut Scene, view: &RenderView<'_>) {
    let to_canvas = view_transform(view.config);
    let display = view.display;

    for &idx in display.children(display.root) {
        let Some(node) = display.node(idx) else {
            continue;
        };
        if !node.visible {
            continue;
        }
        match node.kind {
            DisplayKind::Layer(Layer::Background) => paint_background(scene, to_canvas, view.config),
            DisplayKind::Layer(Layer::Coordinator) => paint_grid(scene, to_canvas, view.config),
            DisplayKind::Layer(Layer::Handle) => {
                if view.handle.visible {
                    paint_handle(scene, to_canvas, view.handle);
                }
            }
            DisplayKind::Container(scene_id) => {
                log::trace!("PAINT container {scene_id}");
                paint_container(scene, to_canvas, view, idx);
            }
            // Variable views, dialogs and the wall are drawn by their owners.
            DisplayKind::Layer(_) | DisplayKind::Root | DisplayKind::Entity(_) => {}
        }
    }
    if view.overlay_visible {
        paint_input_overlay(scene, to_canvas, view.config);
    }
}

/// Stage area in display space.
fn stage_rect(config: &StageConfig) -> Rect {
    Rect::from_center_size(Point::ZERO, (config.stage_width, config.stage_height))
}

/// Whether any part of the entity's rotated box is inside the stage area.
pub fn is_on_stage(t: &EntityTransform, config: &StageConfig) -> bool {
    !stage_rect(config).intersect(display_bounds(t)).is_zero_area()
}

/// Display-space box of the text-entry overlay, along the bottom edge of
/// the stage.
pub fn input_overlay_rect(config: &StageConfig) -> Rect {
    let stage = stage_rect(config);
    Rect::new(
        stage.x0 + INPUT_OVERLAY_MARGIN,
        stage.y1 - INPUT_OVERLAY_MARGIN - INPUT_OVERLAY_HEIGHT,
        stage.x1 - INPUT_OVERLAY_MARGIN,
        stage.y1 - INPUT_OVERLAY_MARGIN,
    )
}

fn paint_input_overlay(scene: &mut Scene, to_canvas: Affine, config: &StageConfig) {
    let rect = input_overlay_rect(config).to_rounded_rect(4.0);
    scene.fill(Fill::NonZero, to_canvas, INPUT_OVERLAY, None, &rect);
    scene.stroke(&Stroke::new(1.0), to_canvas, INPUT_OVERLAY_STROKE, None, &rect);
}

fn paint_background(scene: &mut Scene, to_canvas: Affine, config: &StageConfig) {
    scene.fill(Fill::NonZero, to_canvas, BACKGROUND, None, &stage_rect(config));
}

fn paint_grid(scene: &mut Scene, to_canvas: Affine, config: &StageConfig) {
    let half_w = config.stage_width / 2.0;
    let half_h = config.stage_height / 2.0;
    let stroke = Stroke::new(0.5);

    let mut x = 0.0;
    while x <= half_w {
        for sx in [x, -x] {
            let line = Line::new((sx, -half_h), (sx, half_h));
            scene.stroke(&stroke, to_canvas, GRID, None, &line);
        }
        x += GRID_STEP;
    }
    let mut y = 0.0;
    while y <= half_h {
        for sy in [y, -y] {
            let line = Line::new((-half_w, sy), (half_w, sy));
            scene.stroke(&stroke, to_canvas, GRID, None, &line);
        }
        y += GRID_STEP;
    }
}

fn paint_container(scene: &mut Scene, to_canvas: Affine, view: &RenderView<'_>, container: NodeIndex) {
    let display = view.display;
    for &idx in display.children(container) {
        let Some(node) = display.node(idx) else {
            continue;
        };
        let DisplayKind::Entity(id) = node.kind else {
            continue;
        };
        match view.entities.transform(id) {
            Some(t) if node.visible && t.visible && is_on_stage(t, view.config) => {
                paint_entity(scene, to_canvas, t);
            }
            _ => {}
        }
    }
}

fn paint_entity(scene: &mut Scene, to_canvas: Affine, t: &EntityTransform) {
    let transform = to_canvas * entity_affine(t);
    let rect = local_bounds(t);
    scene.fill(Fill::NonZero, transform, ENTITY_FILL, None, &rect);
    // Scale the stroke back so outlines stay one unit wide.
    let scale = t.scale_x.abs().max(t.scale_y.abs()).max(f64::EPSILON);
    scene.stroke(&Stroke::new(1.0 / scale), transform, ENTITY_STROKE, None, &rect);
}

/// Paint the selection handle: frame, rotation knob, pivot and direction
/// arrow, each shown only when the matching capability is on.
pub fn paint_handle(scene: &mut Scene, to_canvas: Affine, handle: &Handle) {
    let frame = handle_frame(to_canvas, handle);
    let half_w = handle.width.abs() / 2.0;
    let half_h = handle.height.abs() / 2.0;
    let rect = Rect::new(-half_w, -half_h, half_w, half_h);
    let stroke = Stroke::new(1.0);
    scene.stroke(&stroke, frame, HANDLE_STROKE, None, &rect);

    let caps = handle.capabilities;
    if caps.resizable {
        for corner in [rect.origin(), Point::new(rect.x1, rect.y0), Point::new(rect.x0, rect.y1), Point::new(rect.x1, rect.y1)] {
            let knob = Circle::new(corner, KNOB_RADIUS / 2.0);
            scene.fill(Fill::NonZero, frame, HANDLE_KNOB, None, &knob);
            scene.stroke(&stroke, frame, HANDLE_STROKE, None, &knob);
        }
    }
    if caps.rotatable {
        let top = Point::new(0.0, -half_h);
        let knob_center = Point::new(0.0, -half_h - KNOB_OFFSET);
        scene.stroke(&stroke, frame, HANDLE_STROKE, None, &Line::new(top, knob_center));
        let knob = Circle::new(knob_center, KNOB_RADIUS);
        scene.fill(Fill::NonZero, frame, HANDLE_KNOB, None, &knob);
        scene.stroke(&stroke, frame, HANDLE_STROKE, None, &knob);
    }
    let pivot = Point::new(handle.reg_x, handle.reg_y);
    if caps.centerable {
        scene.stroke(&stroke, frame, HANDLE_STROKE, None, &Circle::new(pivot, KNOB_RADIUS));
    }
    if caps.direction_toggle {
        // Direction is measured from "up", clockwise, independent of rotation.
        let theta = (handle.direction - 90.0).to_radians();
        let length = half_w.max(half_h) + KNOB_OFFSET;
        let (dx, dy) = (theta.cos() * length, theta.sin() * length);
        let arrow = to_canvas * Affine::translate(handle.pivot());
        scene.stroke(&stroke, arrow, DIRECTION, None, &Line::new(Point::ZERO, (dx, dy)));
    }
}

/// Handle-local space (origin at the box centre, rotated) → canvas.
pub fn handle_frame(to_canvas: Affine, handle: &Handle) -> Affine {
    to_canvas * Affine::translate((handle.x, handle.y)) * Affine::rotate(handle.rotation.to_radians())
}

/// `Renderer` that records each frame into Vello scenes. Presenting the
/// scene to a surface is the host's job.
pub struct VelloRenderer {
    scene: Scene,
    handle_scene: Scene,
    /// Stage → canvas mapping, refreshed from the config on every frame.
    to_canvas: Affine,
    frames: u64,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new(&StageConfig::default())
    }
}

impl VelloRenderer {
    pub fn new(config: &StageConfig) -> Self {
        Self {
            scene: Scene::new(),
            handle_scene: Scene::new(),
            to_canvas: view_transform(config),
            frames: 0,
        }
    }

    /// Mapping used for the handle overlay.
    pub fn to_canvas(&self) -> Affine {
        self.to_canvas
    }

    /// Last painted stage frame.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Last painted handle overlay.
    pub fn handle_scene(&self) -> &Scene {
        &self.handle_scene
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for VelloRenderer {
    fn render(&mut self, view: &RenderView<'_>) {
        self.scene.reset();
        self.to_canvas = view_transform(view.config);
        paint_stage(&mut self.scene, view);
        self.frames += 1;
    }

    fn render_handle(&mut self, handle: &Handle) {
        self.handle_scene.reset();
        if handle.visible {
            paint_handle(&mut self.handle_scene, self.to_canvas, handle);
        }
    }
}
