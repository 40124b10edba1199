pub mod commands;
pub mod context;
pub mod events;
pub mod handle;
pub mod input;
pub mod shortcuts;
pub mod stage;

pub use commands::{EditCommands, TransformCommand, TransformHistory};
pub use context::StageContext;
pub use events::{
    BoundRect, EventChannel, LifecycleEvent, PointerEvent, SelectionEvent, StageEvents,
    SubscriptionId,
};
pub use handle::{EditState, ForwardSync, HandleController};
pub use input::{ScrollOffset, page_to_stage};
pub use shortcuts::{MoveDirection, Nudge, NudgeMap};
pub use stage::{CanvasHost, HandleGesture, ObjectProvider, Stage};
