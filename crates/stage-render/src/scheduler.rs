//! Fixed-cadence redraw loop with drift compensation.
//!
//! Each tick repaints only when the stage is dirty, then reschedules itself.
//! The next delay absorbs the time the repaint took so the loop stays close
//! to its nominal cadence. At most one tick is ever pending: rescheduling
//! cancels the previous timer first.

use crate::renderer::{RenderView, Renderer};
use stage_core::StageMode;
use std::time::{Duration, Instant};

/// Opaque handle of a scheduled tick, issued by a `FrameTimer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Host timer facility (an event loop, `setTimeout`, a test double).
pub trait FrameTimer {
    /// Arrange for the next tick after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Monotonic time source used to measure repaint duration.
pub trait FrameClock {
    fn now(&self) -> Duration;
}

/// `FrameClock` backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Delay until the next tick, in milliseconds, after a repaint that took
/// `elapsed_ms`.
pub fn next_frame_delay(elapsed_ms: u64, interval_ms: u64) -> u64 {
    let interval = interval_ms.max(1);
    interval - elapsed_ms % interval + interval * (elapsed_ms / interval)
}

#[derive(Debug)]
pub struct RenderScheduler {
    dirty: bool,
    /// Keep `dirty` set for one extra tick (overlay widgets that need two
    /// passes to flush).
    double_dirty: bool,
    pending: Option<TimerHandle>,
    interval_ms: u64,
    frames_rendered: u64,
}

impl RenderScheduler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            dirty: false,
            double_dirty: false,
            pending: None,
            interval_ms: interval_ms.max(1),
            frames_rendered: 0,
        }
    }

    pub fn request_update(&mut self) {
        self.dirty = true;
    }

    /// Guarantee two consecutive repaints.
    pub fn request_update_twice(&mut self) {
        self.dirty = true;
        self.double_dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_double_dirty(&self) -> bool {
        self.double_dirty
    }

    pub fn pending(&self) -> Option<TimerHandle> {
        self.pending
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// One repaint step. Returns whether the renderer was invoked.
    ///
    /// Invisible stages skip the step without consuming the dirty flag.
    pub fn update(
        &mut self,
        mode: StageMode,
        renderer: &mut dyn Renderer,
        view: &RenderView<'_>,
    ) -> bool {
        if mode == StageMode::Invisible || !self.dirty {
            return false;
        }

        renderer.render(view);
        self.frames_rendered += 1;

        if self.double_dirty {
            self.double_dirty = false;
        } else {
            self.dirty = false;
        }
        true
    }

    /// Run a tick: cancel any pending timer, repaint if needed, and schedule
    /// the next tick. Returns the delay that was scheduled.
    pub fn run_frame(
        &mut self,
        mode: StageMode,
        renderer: &mut dyn Renderer,
        view: &RenderView<'_>,
        timer: &mut dyn FrameTimer,
        clock: &dyn FrameClock,
    ) -> Duration {
        self.cancel(timer);

        let start = clock.now();
        self.update(mode, renderer, view);
        let elapsed = clock.now().saturating_sub(start);

        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let delay = Duration::from_millis(next_frame_delay(elapsed_ms, self.interval_ms));
        log::trace!("frame took {elapsed_ms}ms, next tick in {delay:?}");
        self.pending = Some(timer.schedule(delay));
        delay
    }

    /// Cancel the pending tick, if any.
    pub fn cancel(&mut self, timer: &mut dyn FrameTimer) {
        if let Some(handle) = self.pending.take() {
            timer.cancel(handle);
        }
    }
}
