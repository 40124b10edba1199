//! Drive a stage without a window: load two sprites, click one, drag its
//! handle and run a few frames of the redraw loop.
//!
//! Run with `RUST_LOG=trace` to watch the syncs and frames go by.

use stage_core::{Entity, EntityId, EntityTransform, SceneId, StageConfig, StageMode};
use stage_editor::{BoundRect, CanvasHost, HandleGesture, ScrollOffset, Stage, TransformHistory};
use stage_render::{FrameTimer, Point, SystemClock, TimerHandle, VelloRenderer};
use std::time::Duration;

struct Window;

impl CanvasHost for Window {
    fn bounding_client_rect(&self) -> BoundRect {
        BoundRect {
            left: 0.0,
            top: 0.0,
            width: 640.0,
            height: 360.0,
        }
    }
}

#[derive(Default)]
struct SleepTimer {
    next: u64,
}

impl FrameTimer for SleepTimer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        log::trace!("next frame in {delay:?}");
        self.next += 1;
        TimerHandle(self.next)
    }

    fn cancel(&mut self, _handle: TimerHandle) {}
}

fn main() -> Result<(), String> {
    env_logger::init();

    let config = StageConfig::from_json(r#"{ "frame_interval_ms": 16 }"#)?;
    let mut stage = Stage::new(config, StageMode::Visual);
    let scene = SceneId::intern("demo");
    stage.init_containers(&[scene], scene);

    let cat = EntityId::intern("cat");
    let label = EntityId::intern("label");
    stage.load_entity(
        Entity::new(cat, scene, EntityTransform::new(80.0, 60.0).with_position(-60.0, 20.0)),
        None,
    );
    stage.load_entity(
        Entity::new(
            label,
            scene,
            EntityTransform::text_box(120.0, 24.0, false, stage_core::TextAlign::Left)
                .with_position(40.0, -60.0),
        ),
        None,
    );

    let history = TransformHistory::shared(32);
    stage.set_edit_commands(cat, Box::new(history.clone()));

    let mut renderer = VelloRenderer::new(&stage.context().config);
    // Canvas pixel (240, 160) is stage (-60, 15), inside the cat.
    stage.pointer_move(&Window, Point::new(240.0, 160.0), ScrollOffset::default());
    let picked = stage.pointer_down(&renderer);
    stage.pointer_up();
    println!("picked: {picked:?}");

    stage.start_edit();
    stage.apply_handle_gesture(HandleGesture::Move { dx: 30.0, dy: -10.0 });
    stage.apply_handle_gesture(HandleGesture::Rotate { rotation: 45.0 });
    stage.end_edit();

    if let Some(entity) = stage.entity(cat) {
        let t = entity.transform;
        println!("cat at ({}, {}) rotated {}", t.x, t.y, t.rotation);
    }
    println!("undo steps: {}", history.borrow().len());

    let mut timer = SleepTimer::default();
    let clock = SystemClock::new();
    for _ in 0..3 {
        let delay = stage.tick(&mut renderer, &mut timer, &clock);
        std::thread::sleep(delay);
    }
    println!("frames painted: {}", renderer.frames());

    stage.destroy(&mut timer);
    Ok(())
}
