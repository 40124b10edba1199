//! Integration tests: selection handle ↔ entity synchronization through a
//! full stage (stage-editor ↔ stage-core ↔ stage-render).

use pretty_assertions::assert_eq;
use stage_core::{
    Entity, EntityId, EntityTransform, RotateMethod, SceneId, StageConfig, StageMode, TextAlign,
};
use stage_editor::{ForwardSync, HandleGesture, LifecycleEvent, Stage};
use stage_render::hit::display_bounds;
use stage_render::{RenderView, Renderer};

const EPS: f64 = 1e-6;

struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _view: &RenderView<'_>) {}
}

fn stage_with(name: &str, transform: EntityTransform) -> (Stage, EntityId) {
    let scene = SceneId::intern("handle_sync_scene");
    let id = EntityId::intern(name);
    let mut stage = Stage::new(StageConfig::default(), StageMode::Visual);
    stage.init_containers(&[scene], scene);
    assert!(stage.load_entity(Entity::new(id, scene, transform), None));
    (stage, id)
}

fn assert_close(actual: &EntityTransform, expected: &EntityTransform) {
    let pairs = [
        ("x", actual.x, expected.x),
        ("y", actual.y, expected.y),
        ("width", actual.width, expected.width),
        ("height", actual.height, expected.height),
        ("scale_x", actual.scale_x, expected.scale_x),
        ("scale_y", actual.scale_y, expected.scale_y),
        ("reg_x", actual.reg_x, expected.reg_x),
        ("reg_y", actual.reg_y, expected.reg_y),
        ("rotation", actual.rotation, expected.rotation),
        ("direction", actual.direction, expected.direction),
    ];
    for (field, a, e) in pairs {
        assert!((a - e).abs() < EPS, "{field}: expected {e}, got {a}");
    }
}

// ─── Round trip ──────────────────────────────────────────────────────────

#[test]
fn untouched_handle_writes_back_the_same_transform() {
    let cases = [
        ("rt_plain", EntityTransform::new(80.0, 40.0).with_position(12.0, -30.0)),
        (
            "rt_rotated",
            EntityTransform::new(80.0, 40.0)
                .with_position(-50.0, 20.0)
                .with_rotation(33.0, 120.0),
        ),
        (
            "rt_offcentre",
            EntityTransform::new(64.0, 32.0)
                .with_registration(10.0, 4.0)
                .with_scale(1.5, 0.75)
                .with_rotation(210.0, 90.0),
        ),
        (
            "rt_flipped",
            EntityTransform::new(50.0, 50.0)
                .with_scale(-2.0, 1.0)
                .with_position(7.0, 7.0),
        ),
    ];
    for (name, original) in cases {
        let (mut stage, id) = stage_with(name, original);
        stage.select_object(Some(id));
        assert!(stage.update_handle(), "{name}: reverse sync refused");
        assert_close(&stage.entity(id).unwrap().transform, &original);
    }
}

#[test]
fn text_boxes_round_trip_their_position() {
    for (name, align) in [
        ("rt_text_left", TextAlign::Left),
        ("rt_text_center", TextAlign::Center),
        ("rt_text_right", TextAlign::Right),
    ] {
        let original = EntityTransform::text_box(120.0, 24.0, false, align)
            .with_position(40.0, -10.0)
            .with_rotation(30.0, 90.0);
        let (mut stage, id) = stage_with(name, original);
        stage.select_object(Some(id));
        stage.update_handle();
        assert_close(&stage.entity(id).unwrap().transform, &original);
    }
}

#[test]
fn line_break_text_round_trips_through_the_handle() {
    let original = EntityTransform::text_box(100.0, 20.0, true, TextAlign::Left)
        .with_scale(2.0, 1.5)
        .with_position(15.0, -25.0)
        .with_rotation(30.0, 90.0);
    let (mut stage, id) = stage_with("rt_wrapped", original);
    stage.select_object(Some(id));

    let handle = *stage.handle();
    assert_eq!((handle.x, handle.y), (15.0, 25.0));
    assert_eq!((handle.width, handle.height), (200.0, 30.0));

    stage.update_handle();
    assert_close(&stage.entity(id).unwrap().transform, &original);
}

#[test]
fn line_break_text_offsets_the_handle_by_its_registration() {
    let t = EntityTransform::text_box(100.0, 20.0, true, TextAlign::Center)
        .with_registration(10.0, 4.0)
        .with_scale(2.0, 1.0)
        .with_position(50.0, 10.0);
    let (mut stage, id) = stage_with("wrapped_offset", t);
    stage.select_object(Some(id));

    // Offset (reg_x·sx, −reg_y·sy) = (20, −4), unrotated.
    let handle = stage.handle();
    assert!((handle.x - 30.0).abs() < EPS, "x = {}", handle.x);
    assert!((handle.y - (-10.0 - 4.0)).abs() < EPS, "y = {}", handle.y);
}

// ─── Gestures ────────────────────────────────────────────────────────────

#[test]
fn pivot_gesture_moves_the_pivot_but_not_the_box() {
    let original = EntityTransform::new(40.0, 40.0);
    let (mut stage, id) = stage_with("pivot", original);
    stage.select_object(Some(id));
    let box_before = display_bounds(&original);

    assert!(stage.apply_handle_gesture(HandleGesture::Pivot { reg_x: 10.0, reg_y: -5.0 }));

    let t = stage.entity(id).unwrap().transform;
    assert!((t.x - 10.0).abs() < EPS && (t.y - 5.0).abs() < EPS, "pivot at ({}, {})", t.x, t.y);
    assert!((t.reg_x - 30.0).abs() < EPS && (t.reg_y - 15.0).abs() < EPS);
    let box_after = display_bounds(&t);
    assert!((box_after.x0 - box_before.x0).abs() < EPS);
    assert!((box_after.y0 - box_before.y0).abs() < EPS);
    assert!((box_after.x1 - box_before.x1).abs() < EPS);
    assert!((box_after.y1 - box_before.y1).abs() < EPS);
}

#[test]
fn pivot_offset_survives_later_edits() {
    let (mut stage, id) = stage_with("pivot_kept", EntityTransform::new(40.0, 40.0));
    stage.select_object(Some(id));
    stage.apply_handle_gesture(HandleGesture::Pivot { reg_x: 10.0, reg_y: 0.0 });

    stage.apply_handle_gesture(HandleGesture::Move { dx: 5.0, dy: 0.0 });
    stage.select_object(None);
    stage.select_object(Some(id));
    stage.apply_handle_gesture(HandleGesture::Move { dx: 0.0, dy: 0.0 });

    let t = stage.entity(id).unwrap().transform;
    assert!((t.x - 15.0).abs() < EPS);
    assert!((t.reg_x - 30.0).abs() < EPS && (t.reg_y - 20.0).abs() < EPS);
    assert!((stage.handle().reg_x - 10.0).abs() < EPS);
}


#[test]
fn dragging_the_handle_moves_the_entity_in_stage_space() {
    let (mut stage, id) = stage_with("drag", EntityTransform::new(20.0, 20.0));
    stage.select_object(Some(id));

    assert!(stage.apply_handle_gesture(HandleGesture::Move { dx: 10.0, dy: 5.0 }));

    let t = stage.entity(id).unwrap().transform;
    assert!((t.x - 10.0).abs() < EPS);
    // Display space is y-down, stage space y-up.
    assert!((t.y + 5.0).abs() < EPS);
}

#[test]
fn resizing_the_handle_rescales_the_entity() {
    let (mut stage, id) = stage_with("resize", EntityTransform::new(20.0, 10.0));
    stage.select_object(Some(id));

    assert!(stage.apply_handle_gesture(HandleGesture::Resize {
        width: 40.0,
        height: 30.0
    }));

    let t = stage.entity(id).unwrap().transform;
    assert_eq!((t.width, t.height), (20.0, 10.0));
    assert!((t.scale_x - 2.0).abs() < EPS);
    assert!((t.scale_y - 3.0).abs() < EPS);
}

#[test]
fn flipped_entity_stays_flipped_after_resize() {
    let (mut stage, id) = stage_with("flip_resize", EntityTransform::new(20.0, 10.0).with_scale(-1.0, 1.0));
    stage.select_object(Some(id));
    stage.apply_handle_gesture(HandleGesture::Resize {
        width: 60.0,
        height: 10.0,
    });
    assert!((stage.entity(id).unwrap().transform.scale_x + 3.0).abs() < EPS);
}

#[test]
fn line_break_text_resizes_its_box_instead_of_scaling() {
    let (mut stage, id) = stage_with(
        "wrap_resize",
        EntityTransform::text_box(100.0, 20.0, true, TextAlign::Left),
    );
    stage.select_object(Some(id));
    stage.apply_handle_gesture(HandleGesture::Resize {
        width: 150.0,
        height: 40.0,
    });
    let t = stage.entity(id).unwrap().transform;
    assert_eq!((t.width, t.height, t.scale_x, t.scale_y), (150.0, 40.0, 1.0, 1.0));
}

#[test]
fn direction_gesture_only_touches_direction() {
    let original = EntityTransform::new(30.0, 30.0).with_position(5.0, 5.0);
    let (mut stage, id) = stage_with("direction", original);
    stage.select_object(Some(id));

    assert!(stage.apply_handle_gesture(HandleGesture::Direction { direction: 540.0 }));

    let mut expected = original;
    expected.direction = 180.0;
    assert_close(&stage.entity(id).unwrap().transform, &expected);
}

#[test]
fn text_boxes_have_no_pivot_to_move() {
    let (mut stage, id) = stage_with(
        "text_pivot",
        EntityTransform::text_box(60.0, 20.0, false, TextAlign::Center),
    );
    stage.select_object(Some(id));
    assert!(!stage.handle().capabilities.centerable);
    assert!(!stage.apply_handle_gesture(HandleGesture::Pivot { reg_x: 3.0, reg_y: 3.0 }));
}

#[test]
fn vertical_rotate_method_disables_the_rotation_knob() {
    let mut t = EntityTransform::new(30.0, 30.0);
    t.rotate_method = RotateMethod::Vertical;
    let (mut stage, id) = stage_with("vertical", t);
    stage.select_object(Some(id));

    let caps = stage.handle().capabilities;
    assert!(!caps.rotatable);
    assert!(caps.direction_toggle);
}

// ─── Lock ────────────────────────────────────────────────────────────────

#[test]
fn locked_entity_offers_no_affordances() {
    let mut t = EntityTransform::new(30.0, 30.0);
    t.lock = true;
    let (mut stage, id) = stage_with("locked", t);
    stage.select_object(Some(id));
    stage.set_focused(true);

    let caps = stage.handle().capabilities;
    assert!(!caps.draggable && !caps.resizable && !caps.rotatable);
    assert!(!stage.apply_handle_gesture(HandleGesture::Move { dx: 1.0, dy: 1.0 }));
    assert!(!stage.handle_key("ArrowUp", false));
    assert_eq!(stage.entity(id).unwrap().transform, t);
}

// ─── Re-entrancy ─────────────────────────────────────────────────────────

#[test]
fn reverse_sync_does_not_trigger_a_forward_sync() {
    let (mut stage, id) = stage_with("reentrant", EntityTransform::new(30.0, 30.0));
    stage.select_object(Some(id));
    assert_eq!(stage.controller().forward_syncs(), 1);

    for step in 1..=5 {
        stage.apply_handle_gesture(HandleGesture::Move {
            dx: f64::from(step),
            dy: 0.0,
        });
    }

    assert_eq!(stage.controller().forward_syncs(), 1);
    assert_eq!(stage.controller().state(), stage_editor::EditState::Idle);
}

#[test]
fn external_mutation_resyncs_the_handle() {
    let (mut stage, id) = stage_with("external", EntityTransform::new(30.0, 30.0));
    stage.select_object(Some(id));

    stage.mutate_entity(id, |t| {
        t.x = 100.0;
        t.y = 50.0;
    });

    assert_eq!(stage.controller().forward_syncs(), 2);
    assert_eq!((stage.handle().x, stage.handle().y), (100.0, -50.0));
}

#[test]
fn mutation_of_unselected_entity_leaves_handle_alone() {
    let scene = SceneId::intern("handle_sync_scene");
    let (mut stage, id) = stage_with("selected_one", EntityTransform::new(30.0, 30.0));
    let other = EntityId::intern("bystander");
    stage.load_entity(Entity::new(other, scene, EntityTransform::new(5.0, 5.0)), None);
    stage.select_object(Some(id));

    stage.mutate_entity(other, |t| t.x = 99.0);

    assert_eq!(stage.controller().forward_syncs(), 1);
    assert_eq!(stage.handle().x, 0.0);
}

#[test]
fn stop_resyncs_a_handle_left_behind_while_running() {
    let (mut stage, id) = stage_with("run_stop", EntityTransform::new(30.0, 30.0));
    stage.select_object(Some(id));

    stage.handle_lifecycle(LifecycleEvent::Run);
    stage.mutate_entity(id, |t| t.x = 100.0);
    assert_eq!(stage.handle().x, 0.0, "no resync while running");

    stage.handle_lifecycle(LifecycleEvent::Stop);
    assert_eq!(stage.handle().x, 100.0);

    assert!(stage.apply_handle_gesture(HandleGesture::Move { dx: 1.0, dy: 0.0 }));
    assert!((stage.entity(id).unwrap().transform.x - 101.0).abs() < EPS);
}

// ─── Visibility ──────────────────────────────────────────────────────────

#[test]
fn hidden_entity_hides_the_handle_without_a_repaint() {
    let mut t = EntityTransform::new(30.0, 30.0);
    t.visible = false;
    let (mut stage, id) = stage_with("hidden", t);
    stage.update(&mut NullRenderer);
    assert!(!stage.context().scheduler.is_dirty());

    stage.select_object(Some(id));

    assert!(!stage.handle().visible);
    assert!(!stage.context().scheduler.is_dirty());
    assert!(!stage.apply_handle_gesture(HandleGesture::Move { dx: 1.0, dy: 0.0 }));
}

#[test]
fn clearing_the_selection_hides_the_handle_and_repaints() {
    let (mut stage, id) = stage_with("cleared", EntityTransform::new(30.0, 30.0));
    stage.select_object(Some(id));
    stage.update(&mut NullRenderer);

    stage.select_object(None);

    assert!(!stage.handle().visible);
    assert!(stage.context().scheduler.is_dirty());
    assert_eq!(stage.update_object(), ForwardSync::Cleared);
}

#[test]
fn invisible_stage_never_syncs_the_handle() {
    let scene = SceneId::intern("handle_sync_invisible");
    let id = EntityId::intern("ghost_sprite");
    let mut stage = Stage::new(StageConfig::default(), StageMode::Invisible);
    stage.init_containers(&[scene], scene);
    stage.load_entity(Entity::new(id, scene, EntityTransform::new(10.0, 10.0)), None);

    stage.select_object(Some(id));

    assert_eq!(stage.update_object(), ForwardSync::Suppressed);
    assert!(!stage.handle().visible);
    assert_eq!(stage.controller().forward_syncs(), 0);
}
