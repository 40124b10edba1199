//! Handle controller: entity ↔ handle synchronization.
//!
//! - **Entity → Handle** (forward): after a selection change or an entity
//!   mutation, the handle pose and affordances are re-derived from the
//!   selected entity's transform.
//!
//! - **Handle → Entity** (reverse): when the user drags, resizes or rotates
//!   the handle, a new entity transform is derived from the handle pose.
//!
//! Writing the entity during a reverse sync notifies the stage like any other
//! mutation, which would start a forward sync in the middle of the edit. The
//! controller's `EditState` blocks that: forward syncs requested while
//! `Editing` are suppressed.
//!
//! Handle coordinates live in display space (y-down); entity coordinates in
//! stage space (y-up). Every formula below flips y at that boundary.

use stage_core::{Capabilities, EntityTransform, Handle, RotateMethod, TextAlign};

/// Re-entrancy state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    /// A reverse sync is writing the entity.
    Editing,
}

impl EditState {
    /// `Idle` → `Editing`. Returns `false` if an edit is already running.
    pub fn enter(&mut self) -> bool {
        match self {
            EditState::Idle => {
                *self = EditState::Editing;
                true
            }
            EditState::Editing => false,
        }
    }

    /// `Editing` → `Idle`.
    pub fn exit(&mut self) {
        *self = EditState::Idle;
    }
}

/// What a forward sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardSync {
    /// An edit is in progress (or the stage is headless); nothing was touched.
    Suppressed,
    /// Nothing is selected; the handle was hidden.
    Cleared,
    /// The selected entity is hidden; so is the handle.
    Hidden,
    /// The handle was repositioned and is visible.
    Shown,
}

/// Affordances for an entity, from its type, rotate method and lock.
pub fn capabilities_for(t: &EntityTransform) -> Capabilities {
    if t.lock {
        return Capabilities::NONE;
    }
    let rotatable = t.rotate_method == RotateMethod::Free;
    Capabilities {
        rotatable,
        direction_toggle: true,
        resizable: true,
        centerable: !t.is_text_box(),
        draggable: true,
    }
}

/// Offset of the registration point from the displayed box centre, in
/// display units, before rotation.
pub fn pivot_offset(t: &EntityTransform) -> (f64, f64) {
    match t.text_align() {
        None => (
            (t.reg_x - t.width / 2.0) * t.scale_x,
            (t.height / 2.0 - t.reg_y) * t.scale_y,
        ),
        Some(_) if t.line_break() => (t.reg_x * t.scale_x, -t.reg_y * t.scale_y),
        Some(align) => {
            let reg_x = match align {
                TextAlign::Left => -t.width / 2.0 * t.scale_x,
                TextAlign::Center => t.reg_x * t.scale_x,
                TextAlign::Right => t.width / 2.0 * t.scale_x,
            };
            (reg_x, -t.reg_y * t.scale_y)
        }
    }
}

/// Handle pose for an entity. Capabilities and visibility are included.
pub fn handle_from_entity(t: &EntityTransform) -> Handle {
    let (width, height) = t.scaled_size();
    let (ox, oy) = pivot_offset(t);
    let (sin, cos) = t.rotation.to_radians().sin_cos();

    Handle {
        x: t.x - ox * cos - oy * sin,
        y: -t.y - ox * sin + oy * cos,
        width,
        height,
        reg_x: (t.reg_x - t.width / 2.0) * t.scale_x,
        reg_y: (t.reg_y - t.height / 2.0) * t.scale_y,
        rotation: t.rotation,
        direction: t.direction,
        capabilities: capabilities_for(t),
        visible: t.visible,
    }
}

/// New entity transform for the current handle pose.
///
/// Axes whose divisor is zero are left untouched instead of producing
/// `NaN` or infinity.
pub fn entity_from_handle(handle: &Handle, current: &EntityTransform) -> EntityTransform {
    let mut t = *current;

    if t.line_break() {
        if t.scale_y != 0.0 {
            t.height = handle.height / t.scale_y;
        }
        if t.scale_x != 0.0 {
            t.width = handle.width / t.scale_x;
        }
    } else {
        if t.width != 0.0 {
            let scale_x = (handle.width / t.width).abs();
            t.scale_x = if current.is_flipped() { -scale_x } else { scale_x };
        }
        if t.height != 0.0 {
            t.scale_y = handle.height / t.height;
        }
    }

    let (sin, cos) = handle.rotation.to_radians().sin_cos();
    match t.text_align() {
        None => {
            t.x = handle.x + handle.reg_x * cos - handle.reg_y * sin;
            t.y = -handle.y - handle.reg_x * sin - handle.reg_y * cos;
            if t.scale_x != 0.0 {
                t.reg_x = t.width / 2.0 + handle.reg_x / t.scale_x;
            }
            if t.scale_y != 0.0 {
                t.reg_y = t.height / 2.0 + handle.reg_y / t.scale_y;
            }
        }
        Some(_) if t.line_break() => {
            t.x = handle.x;
            t.y = -handle.y;
        }
        Some(TextAlign::Left) => {
            t.x = handle.x - handle.width / 2.0 * cos;
            t.y = -handle.y + handle.width / 2.0 * sin;
        }
        Some(TextAlign::Center) => {
            t.x = handle.x;
            t.y = -handle.y;
        }
        Some(TextAlign::Right) => {
            t.x = handle.x + handle.width / 2.0 * cos;
            t.y = -handle.y - handle.width / 2.0 * sin;
        }
    }

    t.direction = handle.direction;
    t.rotation = handle.rotation;
    t
}

/// Owns the handle widget's pose and the re-entrancy state.
#[derive(Debug, Default)]
pub struct HandleController {
    handle: Handle,
    state: EditState,
    forward_syncs: u64,
}

impl HandleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Mutable access for gestures. Call `reverse_sync` afterwards.
    pub fn handle_mut(&mut self) -> &mut Handle {
        &mut self.handle
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    /// Forward syncs that actually ran (suppressed ones are not counted).
    pub fn forward_syncs(&self) -> u64 {
        self.forward_syncs
    }

    pub fn hide(&mut self) {
        self.handle.visible = false;
    }

    /// Entity → handle.
    pub fn sync_from_entity(&mut self, entity: Option<&EntityTransform>) -> ForwardSync {
        if self.state == EditState::Editing {
            log::trace!("forward sync suppressed during edit");
            return ForwardSync::Suppressed;
        }
        self.forward_syncs += 1;

        let Some(t) = entity else {
            self.handle.visible = false;
            return ForwardSync::Cleared;
        };

        self.handle = handle_from_entity(t);
        if self.handle.visible {
            ForwardSync::Shown
        } else {
            ForwardSync::Hidden
        }
    }

    /// Enter the editing state. Returns `false` when an edit is already
    /// running, in which case the caller must not write the entity.
    pub fn begin_reverse(&mut self) -> bool {
        self.state.enter()
    }

    pub fn end_reverse(&mut self) {
        self.state.exit();
    }

    /// Handle → entity, for the current handle pose.
    pub fn reverse_sync(&self, current: &EntityTransform) -> EntityTransform {
        entity_from_handle(&self.handle, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn edit_state_transitions() {
        let mut state = EditState::default();
        assert!(state.enter());
        assert!(!state.enter());
        state.exit();
        assert_eq!(state, EditState::Idle);
    }

    #[test]
    fn capability_table() {
        let free = EntityTransform::new(10.0, 10.0);
        assert_eq!(capabilities_for(&free), Capabilities::ALL);

        let mut vertical = free;
        vertical.rotate_method = RotateMethod::Vertical;
        let caps = capabilities_for(&vertical);
        assert!(!caps.rotatable);
        assert!(caps.direction_toggle);

        let mut fixed = free;
        fixed.rotate_method = RotateMethod::None;
        assert!(!capabilities_for(&fixed).rotatable);

        let text = EntityTransform::text_box(10.0, 10.0, true, TextAlign::Left);
        let caps = capabilities_for(&text);
        assert!(!caps.centerable);
        assert!(caps.resizable);

        let mut locked = free;
        locked.lock = true;
        assert_eq!(capabilities_for(&locked), Capabilities::NONE);
    }

    #[test]
    fn centred_entity_maps_to_handle_at_same_point() {
        let t = EntityTransform::new(100.0, 50.0)
            .with_position(30.0, 40.0)
            .with_scale(2.0, 0.5);
        let h = handle_from_entity(&t);
        assert!(close(h.x, 30.0));
        assert!(close(h.y, -40.0));
        assert!(close(h.width, 200.0));
        assert!(close(h.height, 25.0));
        assert!(close(h.reg_x, 0.0));
        assert!(close(h.reg_y, 0.0));
    }

    #[test]
    fn pivot_offset_moves_handle_centre() {
        // Pivot at the top-left corner: the box centre is right of and
        // below the entity position.
        let t = EntityTransform::new(100.0, 50.0).with_registration(0.0, 0.0);
        let h = handle_from_entity(&t);
        assert!(close(h.x, 50.0));
        assert!(close(h.y, 25.0));
    }

    #[test]
    fn text_alignment_offsets() {
        let mut t = EntityTransform::text_box(80.0, 20.0, false, TextAlign::Left)
            .with_scale(1.5, 1.0)
            .with_registration(7.0, 3.0);
        assert!(close(pivot_offset(&t).0, -40.0 * 1.5));

        t.object_type = stage_core::ObjectType::TextBox {
            line_break: false,
            text_align: TextAlign::Right,
        };
        assert!(close(pivot_offset(&t).0, 40.0 * 1.5));

        t.object_type = stage_core::ObjectType::TextBox {
            line_break: false,
            text_align: TextAlign::Center,
        };
        assert!(close(pivot_offset(&t).0, 7.0 * 1.5));
        assert!(close(pivot_offset(&t).1, -3.0));
    }

    #[test]
    fn line_break_text_uses_registration() {
        let t = EntityTransform::text_box(80.0, 20.0, true, TextAlign::Left)
            .with_scale(2.0, 2.0)
            .with_registration(4.0, 5.0);
        assert_eq!(pivot_offset(&t), (8.0, -10.0));
    }

    #[test]
    fn reverse_restores_flip_sign() {
        let t = EntityTransform::new(40.0, 20.0).with_scale(-1.0, 1.0);
        let mut h = handle_from_entity(&t);
        h.width = 80.0;
        let back = entity_from_handle(&h, &t);
        assert!(close(back.scale_x, -2.0));
    }

    #[test]
    fn reverse_skips_zero_dimensions() {
        let t = EntityTransform::new(0.0, 0.0).with_scale(3.0, 4.0);
        let mut h = handle_from_entity(&t);
        h.width = 50.0;
        h.height = 50.0;
        let back = entity_from_handle(&h, &t);
        assert_eq!(back.scale_x, 3.0);
        assert_eq!(back.scale_y, 4.0);
        assert!(back.x.is_finite() && back.reg_x.is_finite());
    }

    #[test]
    fn line_break_resize_changes_box_not_scale() {
        let t = EntityTransform::text_box(100.0, 40.0, true, TextAlign::Center).with_scale(2.0, 2.0);
        let mut h = handle_from_entity(&t);
        h.width = 300.0;
        h.height = 100.0;
        let back = entity_from_handle(&h, &t);
        assert_eq!((back.width, back.height), (150.0, 50.0));
        assert_eq!((back.scale_x, back.scale_y), (2.0, 2.0));
    }

    #[test]
    fn right_aligned_text_anchor_follows_rotation() {
        let t = EntityTransform::text_box(60.0, 10.0, false, TextAlign::Right);
        let mut h = handle_from_entity(&t);
        h.x = 0.0;
        h.y = 0.0;
        h.rotation = 90.0;
        let back = entity_from_handle(&h, &t);
        assert!(close(back.x, 0.0));
        assert!(close(back.y, -30.0));
        assert_eq!(back.rotation, 90.0);
    }

    #[test]
    fn suppressed_sync_does_not_count() {
        let mut controller = HandleController::new();
        let t = EntityTransform::new(10.0, 10.0);
        assert_eq!(controller.sync_from_entity(Some(&t)), ForwardSync::Shown);
        assert!(controller.begin_reverse());
        assert_eq!(controller.sync_from_entity(Some(&t)), ForwardSync::Suppressed);
        controller.end_reverse();
        assert_eq!(controller.forward_syncs(), 1);
    }

    #[test]
    fn hidden_entity_hides_handle() {
        let mut controller = HandleController::new();
        let mut t = EntityTransform::new(10.0, 10.0);
        t.visible = false;
        assert_eq!(controller.sync_from_entity(Some(&t)), ForwardSync::Hidden);
        assert!(!controller.handle().visible);
        assert_eq!(controller.sync_from_entity(None), ForwardSync::Cleared);
    }
}
