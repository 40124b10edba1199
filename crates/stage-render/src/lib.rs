pub mod hit;
pub mod paint;
pub mod renderer;
pub mod scheduler;

pub use paint::VelloRenderer;
pub use renderer::{RenderView, Renderer};
pub use scheduler::{FrameClock, FrameTimer, RenderScheduler, SystemClock, TimerHandle, next_frame_delay};

// Geometry types used across the stage API.
pub use kurbo::Point;
