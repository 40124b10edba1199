//! The stage session.
//!
//! `Stage` owns the `StageContext` (display tree, scene containers, entity
//! store, scheduler), the handle controller and the current selection. All
//! interaction from the host goes through it: selection, pointer and
//! keyboard input, handle gestures, entity loading and the frame loop.

use crate::commands::EditCommands;
use crate::context::StageContext;
use crate::events::{BoundRect, LifecycleEvent, PointerEvent, SelectionEvent, StageEvents};
use crate::handle::{ForwardSync, HandleController};
use crate::input::{ScrollOffset, page_to_stage};
use crate::shortcuts::{MoveDirection, NudgeMap};
use kurbo::Point;
use stage_core::{
    DisplayKind, EngineState, Entity, EntityId, EntityTransform, Handle, Layer, SceneId,
    StageConfig, StageMode,
};
use stage_render::hit::topmost_entity;
use stage_render::{FrameClock, FrameTimer, RenderView, Renderer};
use std::collections::HashMap;
use std::time::Duration;

/// Source of the ordered list of active objects, frontmost first.
pub trait ObjectProvider {
    fn current_objects(&self) -> Vec<EntityId>;
}

impl ObjectProvider for [EntityId] {
    fn current_objects(&self) -> Vec<EntityId> {
        self.to_vec()
    }
}

impl ObjectProvider for Vec<EntityId> {
    fn current_objects(&self) -> Vec<EntityId> {
        self.clone()
    }
}

/// Host element the canvas lives in.
pub trait CanvasHost {
    fn bounding_client_rect(&self) -> BoundRect;
}

/// A user manipulation of the handle widget. Coordinates are display space
/// (y-down); angles are degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandleGesture {
    Move { dx: f64, dy: f64 },
    Resize { width: f64, height: f64 },
    Rotate { rotation: f64 },
    Direction { direction: f64 },
    /// Move the pivot; the box stays where it is.
    Pivot { reg_x: f64, reg_y: f64 },
}

pub struct Stage {
    ctx: StageContext,
    controller: HandleController,
    selected: Option<EntityId>,
    edit_commands: HashMap<EntityId, Box<dyn EditCommands>>,
    events: StageEvents,
    /// Entity mutations resync the handle only while stopped.
    auto_update: bool,
    entity_selectable: bool,
    focused: bool,
    is_click: bool,
    is_object_click: bool,
    mouse: Point,
    bound_rect: Option<BoundRect>,
    overlay_visible: bool,
    /// The handle moved since the renderer last drew it.
    handle_stale: bool,
    /// The selected entity changed while auto-resync was off; the handle
    /// pose no longer matches it.
    handle_out_of_sync: bool,
}

impl Stage {
    pub fn new(config: StageConfig, mode: StageMode) -> Self {
        log::debug!("new stage ({mode:?})");
        Self {
            ctx: StageContext::new(config, mode),
            controller: HandleController::new(),
            selected: None,
            edit_commands: HashMap::new(),
            events: StageEvents::default(),
            auto_update: true,
            entity_selectable: true,
            focused: false,
            is_click: false,
            is_object_click: false,
            mouse: Point::ZERO,
            bound_rect: None,
            overlay_visible: false,
            handle_stale: false,
            handle_out_of_sync: false,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn context(&self) -> &StageContext {
        &self.ctx
    }

    pub fn handle(&self) -> &Handle {
        self.controller.handle()
    }

    pub fn controller(&self) -> &HandleController {
        &self.controller
    }

    pub fn events_mut(&mut self) -> &mut StageEvents {
        &mut self.events
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.ctx.entities.get(id)
    }

    pub fn mouse_coordinate(&self) -> Point {
        self.mouse
    }

    pub fn is_click(&self) -> bool {
        self.is_click
    }

    pub fn is_object_click(&self) -> bool {
        self.is_object_click
    }

    pub fn is_overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    // ─── Scene containers ────────────────────────────────────────────────

    /// Create containers for `scenes` and activate `selected`.
    pub fn init_containers(&mut self, scenes: &[SceneId], selected: SceneId) {
        let index = self.ctx.config.container_index;
        let mode = self.ctx.mode;
        self.ctx
            .containers
            .init(&mut self.ctx.display, scenes, selected, mode, index);
        self.ctx.scheduler.request_update();
    }

    /// Make `scene` the active scene. Unknown scenes and an empty registry
    /// leave the stage as it was.
    pub fn select_container(&mut self, scene: SceneId) -> bool {
        let index = self.ctx.config.container_index;
        let activated = self
            .ctx
            .containers
            .activate(&mut self.ctx.display, scene, index);
        if activated {
            self.ctx.scheduler.request_update();
        }
        activated
    }

    /// Discard a scene's container and the entities in it.
    pub fn remove_container(&mut self, scene: SceneId) -> bool {
        if !self.ctx.containers.remove(&mut self.ctx.display, scene) {
            return false;
        }
        for id in self.ctx.entities.in_scene(scene) {
            self.edit_commands.remove(&id);
        }
        self.ctx.entities.remove_scene(scene);
        if self
            .selected
            .is_some_and(|id| !self.ctx.entities.contains(id))
        {
            self.select_object(None);
        }
        self.ctx.scheduler.request_update();
        true
    }

    /// Create a container for a scene added after initialisation.
    pub fn add_container(&mut self, scene: SceneId) {
        self.ctx.containers.create(&mut self.ctx.display, scene);
    }

    /// Reorder containers to follow the scene order.
    pub fn reindex_containers(&mut self, order: &[SceneId]) {
        self.ctx.containers.reindex(order);
    }

    // ─── Entities ────────────────────────────────────────────────────────

    /// Place an entity in its scene's container, at `index` or on top.
    /// Returns `false` when the scene has no container.
    pub fn load_entity(&mut self, entity: Entity, index: Option<usize>) -> bool {
        let Some(container) = self.ctx.containers.lookup(entity.scene).copied() else {
            log::warn!("load_entity: no container for {}", entity.scene);
            return false;
        };
        let node = match self.ctx.display.entity_node(entity.id) {
            Some(node) => node,
            None => self.ctx.display.add_node(DisplayKind::Entity(entity.id)),
        };
        self.ctx.display.attach(container.node, node, index);
        log::debug!("loaded {} into {}", entity.id, entity.scene);
        self.ctx.entities.insert(entity);
        self.ctx.scheduler.request_update();
        true
    }

    /// Remove an entity from the stage.
    pub fn unload_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.ctx.entities.remove(id)?;
        if let Some(node) = self.ctx.display.entity_node(id) {
            self.ctx.display.remove_subtree(node);
        }
        self.edit_commands.remove(&id);
        if self.selected == Some(id) {
            self.select_object(None);
        }
        self.ctx.scheduler.request_update();
        Some(entity)
    }

    /// Move an entity to `index` in the active container's paint order.
    /// Returns whether its position changed.
    pub fn set_entity_index(&mut self, id: EntityId, index: usize) -> bool {
        let Some(container) = self.ctx.containers.selected().copied() else {
            return false;
        };
        let Some(node) = self.ctx.display.entity_node(id) else {
            return false;
        };
        let moved = self.ctx.display.set_child_index(container.node, node, index);
        self.ctx.scheduler.request_update();
        moved
    }

    /// Resync the active container's paint order with the object list:
    /// the first object ends up frontmost.
    pub fn sort_zorder(&mut self, provider: &dyn ObjectProvider) {
        let Some(container) = self.ctx.containers.selected().copied() else {
            return;
        };
        let mut index = 0;
        for id in provider.current_objects().into_iter().rev() {
            let Some(node) = self.ctx.display.entity_node(id) else {
                continue;
            };
            if self.ctx.display.parent(node) != Some(container.node) {
                continue;
            }
            self.ctx.display.set_child_index(container.node, node, index);
            index += 1;
        }
        self.ctx.scheduler.request_update();
    }

    /// Apply an external edit to an entity (a command, a block, a script).
    ///
    /// The selected entity's handle follows while the engine is stopped.
    pub fn mutate_entity(&mut self, id: EntityId, edit: impl FnOnce(&mut EntityTransform)) -> bool {
        let Some(entity) = self.ctx.entities.get_mut(id) else {
            return false;
        };
        edit(&mut entity.transform);
        self.ctx.scheduler.request_update();
        self.entity_changed(id);
        true
    }

    /// Reaction to any entity mutation.
    fn entity_changed(&mut self, id: EntityId) {
        if self.selected != Some(id) {
            return;
        }
        if self.auto_update && self.ctx.engine.is_stopped() {
            self.update_object();
        } else {
            self.handle_out_of_sync = true;
        }
    }

    /// Register the optional edit-bracket capability of an entity's owner.
    pub fn set_edit_commands(&mut self, id: EntityId, commands: Box<dyn EditCommands>) {
        self.edit_commands.insert(id, commands);
    }

    pub fn clear_edit_commands(&mut self, id: EntityId) -> bool {
        self.edit_commands.remove(&id).is_some()
    }

    // ─── Selection & handle ──────────────────────────────────────────────

    /// Select an entity, or clear the selection with `None`, and resync the
    /// handle. Unknown ids are rejected.
    pub fn select_object(&mut self, id: Option<EntityId>) -> bool {
        if let Some(id) = id
            && !self.ctx.entities.contains(id)
        {
            log::warn!("select_object: unknown entity {id}");
            return false;
        }
        let previous = self.selected;
        self.selected = id;
        if previous != id {
            self.events.selection.emit(&SelectionEvent::Changed {
                previous,
                current: id,
            });
        }
        self.update_object();
        true
    }

    /// Entity → handle for the current selection.
    pub fn update_object(&mut self) -> ForwardSync {
        if self.ctx.mode == StageMode::Invisible {
            return ForwardSync::Suppressed;
        }
        let transform = self.selected.and_then(|id| self.ctx.entities.transform(id));
        let outcome = self.controller.sync_from_entity(transform);
        if outcome != ForwardSync::Suppressed {
            self.handle_out_of_sync = false;
        }
        match outcome {
            ForwardSync::Shown => {
                self.ctx.scheduler.request_update();
                self.handle_stale = true;
            }
            ForwardSync::Cleared => self.ctx.scheduler.request_update(),
            ForwardSync::Hidden | ForwardSync::Suppressed => {}
        }
        log::trace!("forward sync: {outcome:?}");
        outcome
    }

    /// Apply a user gesture to the handle and write the result back to the
    /// selected entity. Gestures the handle does not currently allow are
    /// rejected.
    pub fn apply_handle_gesture(&mut self, gesture: HandleGesture) -> bool {
        if !self.ctx.engine.is_stopped() || self.selected.is_none() {
            return false;
        }
        // Never write a pose derived from an outdated entity back into it.
        if self.handle_out_of_sync {
            self.update_object();
        }
        let handle = self.controller.handle_mut();
        if !handle.visible {
            return false;
        }
        let caps = handle.capabilities;
        match gesture {
            HandleGesture::Move { dx, dy } if caps.draggable => {
                handle.x += dx;
                handle.y += dy;
            }
            HandleGesture::Resize { width, height } if caps.resizable => {
                handle.width = width;
                handle.height = height;
            }
            HandleGesture::Rotate { rotation } if caps.rotatable => {
                handle.rotation = rotation.rem_euclid(360.0);
            }
            HandleGesture::Direction { direction } if caps.direction_toggle => {
                handle.direction = direction.rem_euclid(360.0);
            }
            HandleGesture::Pivot { reg_x, reg_y } if caps.centerable => {
                handle.reg_x = reg_x;
                handle.reg_y = reg_y;
            }
            _ => {
                log::debug!("gesture {gesture:?} not allowed by {caps:?}");
                return false;
            }
        }
        self.handle_stale = true;
        self.update_handle()
    }

    /// Handle → entity for the current selection.
    ///
    /// Runs inside the controller's editing state, so the entity-changed
    /// notification raised by the write does not resync the handle.
    pub fn update_handle(&mut self) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let Some(current) = self.ctx.entities.transform(id).copied() else {
            return false;
        };
        if !self.controller.begin_reverse() {
            return false;
        }
        let updated = self.controller.reverse_sync(&current);
        self.mutate_entity(id, |t| *t = updated);
        self.controller.end_reverse();
        true
    }

    /// A handle gesture is starting.
    pub fn start_edit(&mut self) {
        self.with_edit_commands(|commands, t| commands.init_command(t));
    }

    /// A handle gesture ended.
    pub fn end_edit(&mut self) {
        self.with_edit_commands(|commands, t| commands.check_command(t));
    }

    fn with_edit_commands(&mut self, f: impl FnOnce(&mut dyn EditCommands, &EntityTransform)) {
        let Some(id) = self.selected else {
            return;
        };
        let Some(transform) = self.ctx.entities.transform(id) else {
            return;
        };
        if let Some(commands) = self.edit_commands.get_mut(&id) {
            f(commands.as_mut(), transform);
        }
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Nudge the selected entity. Ignored without a selection, while the
    /// stage is unfocused, or when the entity is locked.
    pub fn move_selected_by(&mut self, direction: MoveDirection, distance: f64) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        if !self.focused {
            return false;
        }
        let Some(entity) = self.ctx.entities.get_mut(id) else {
            return false;
        };
        if entity.transform.lock {
            return false;
        }
        let (dx, dy) = direction.delta();
        entity.transform.x += dx * distance;
        entity.transform.y += dy * distance;
        self.ctx.scheduler.request_update();
        self.update_object();
        true
    }

    /// Resolve an arrow key and nudge the selection.
    pub fn handle_key(&mut self, key: &str, shift: bool) -> bool {
        match NudgeMap::resolve(key, shift, &self.ctx.config) {
            Some(nudge) => self.move_selected_by(nudge.direction, nudge.distance),
            None => false,
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn set_entity_selectable(&mut self, selectable: bool) {
        self.entity_selectable = selectable;
    }

    /// Entities can be picked with the pointer only while stopped.
    pub fn is_entity_selectable(&self) -> bool {
        self.ctx.engine.is_stopped() && self.entity_selectable
    }

    /// Cached canvas bounding rectangle, measured on first use.
    pub fn bound_rect(&mut self, host: &dyn CanvasHost) -> BoundRect {
        match self.bound_rect {
            Some(rect) => rect,
            None => self.update_bound_rect(host),
        }
    }

    pub fn update_bound_rect(&mut self, host: &dyn CanvasHost) -> BoundRect {
        let rect = host.bounding_client_rect();
        self.bound_rect = Some(rect);
        rect
    }

    /// Pointer moved over the canvas at a page position.
    pub fn pointer_move(&mut self, host: &dyn CanvasHost, page: Point, scroll: ScrollOffset) -> Point {
        let rect = self.bound_rect(host);
        self.mouse = page_to_stage(page.x, page.y, &rect, scroll, &self.ctx.config);
        self.events
            .pointer
            .emit(&PointerEvent::StageMouseMove { point: self.mouse });
        self.mouse
    }

    /// Pointer pressed at the current mouse coordinate. Selects the topmost
    /// entity under the pointer when selection is allowed.
    pub fn pointer_down(&mut self, renderer: &dyn Renderer) -> Option<EntityId> {
        let point = self.mouse;
        self.events
            .pointer
            .emit(&PointerEvent::CanvasClick { point });
        self.is_click = true;
        self.is_object_click = false;

        if !self.is_entity_selectable() {
            return None;
        }
        let hit = self.pick(renderer, point)?;
        self.is_object_click = true;
        self.select_object(Some(hit));
        Some(hit)
    }

    pub fn pointer_up(&mut self) {
        self.is_click = false;
        self.events
            .pointer
            .emit(&PointerEvent::CanvasClickCanceled { point: self.mouse });
    }

    pub fn pointer_out(&mut self) {
        self.events.pointer.emit(&PointerEvent::StageMouseOut);
    }

    /// Topmost entity of the active container under `point`.
    pub fn pick(&self, renderer: &dyn Renderer, point: Point) -> Option<EntityId> {
        let container = self.ctx.containers.selected()?;
        topmost_entity(&self.ctx.display, container.node, &self.ctx.entities, |t| {
            renderer.hit_test(t, point)
        })
    }

    /// Whether `point` (default: the current mouse coordinate) falls inside
    /// an entity.
    pub fn hit_test_object(&self, renderer: &dyn Renderer, id: EntityId, point: Option<Point>) -> bool {
        self.ctx
            .entities
            .transform(id)
            .is_some_and(|t| renderer.hit_test(t, point.unwrap_or(self.mouse)))
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    pub fn handle_lifecycle(&mut self, event: LifecycleEvent) {
        log::debug!("lifecycle: {event:?}");
        match event {
            LifecycleEvent::LoadComplete { objects } => {
                if self.ctx.engine.is_stopped() {
                    self.sort_zorder(&objects);
                }
            }
            LifecycleEvent::Run => {
                self.ctx.engine = EngineState::Running;
                self.auto_update = false;
            }
            LifecycleEvent::Stop => {
                self.ctx.engine = EngineState::Stopped;
                self.auto_update = true;
                self.update_object();
            }
            LifecycleEvent::WindowResized(rect) => {
                self.bound_rect = Some(rect);
            }
        }
    }

    /// Show or hide the coordinate grid.
    pub fn toggle_coordinator(&mut self) -> bool {
        let Some(idx) = self.ctx.display.layer(Layer::Coordinator) else {
            return false;
        };
        let Some(node) = self.ctx.display.node_mut(idx) else {
            return false;
        };
        node.visible = !node.visible;
        let visible = node.visible;
        self.ctx.scheduler.request_update();
        visible
    }

    /// Show the text-entry overlay. It needs two repaints to settle.
    pub fn show_input_overlay(&mut self) {
        self.overlay_visible = true;
        self.ctx.scheduler.request_update_twice();
    }

    pub fn hide_input_overlay(&mut self) {
        self.overlay_visible = false;
        self.ctx.scheduler.request_update();
    }

    // ─── Frame loop ──────────────────────────────────────────────────────

    fn redraw_handle(&mut self, renderer: &mut dyn Renderer) {
        if self.handle_stale && self.ctx.is_visual() {
            renderer.render_handle(self.controller.handle());
            self.handle_stale = false;
        }
    }

    /// One repaint step without scheduling. Returns whether a frame was
    /// painted.
    pub fn update(&mut self, renderer: &mut dyn Renderer) -> bool {
        self.redraw_handle(renderer);
        let view = RenderView {
            display: &self.ctx.display,
            entities: &self.ctx.entities,
            handle: self.controller.handle(),
            config: &self.ctx.config,
            overlay_visible: self.overlay_visible,
        };
        self.ctx.scheduler.update(self.ctx.mode, renderer, &view)
    }

    /// Scheduler tick: repaint if dirty and reschedule.
    pub fn tick(
        &mut self,
        renderer: &mut dyn Renderer,
        timer: &mut dyn FrameTimer,
        clock: &dyn FrameClock,
    ) -> Duration {
        self.redraw_handle(renderer);
        let view = RenderView {
            display: &self.ctx.display,
            entities: &self.ctx.entities,
            handle: self.controller.handle(),
            config: &self.ctx.config,
            overlay_visible: self.overlay_visible,
        };
        self.ctx
            .scheduler
            .run_frame(self.ctx.mode, renderer, &view, timer, clock)
    }

    /// Tear the stage down. Container operations afterwards are no-ops.
    pub fn destroy(&mut self, timer: &mut dyn FrameTimer) {
        log::debug!("destroy stage");
        self.ctx.scheduler.cancel(timer);
        self.ctx.containers.clear(&mut self.ctx.display);
        self.ctx.display.clear();
        self.ctx.entities.clear();
        self.edit_commands.clear();
        self.events.pointer.clear();
        self.events.selection.clear();
        self.selected = None;
        self.controller.hide();
        self.handle_stale = false;
        self.handle_out_of_sync = false;
    }
}
