//! Typed stage events.
//!
//! One channel per event category, each with explicit subscribe /
//! unsubscribe. Dispatch is synchronous: `emit` runs every subscriber before
//! returning.

use kurbo::Point;
use smallvec::SmallVec;
use stage_core::EntityId;

/// Pointer activity on the canvas, dispatched by the stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    CanvasClick { point: Point },
    CanvasClickCanceled { point: Point },
    StageMouseMove { point: Point },
    StageMouseOut,
}

/// Selection changes, dispatched by the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Changed {
        previous: Option<EntityId>,
        current: Option<EntityId>,
    },
}

/// Bounding rectangle of the canvas element in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Events the stage reacts to, delivered by its host.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// A project finished loading; carries the active objects, frontmost
    /// first, for a z-order resync.
    LoadComplete { objects: Vec<EntityId> },
    Run,
    Stop,
    WindowResized(BoundRect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<E> = Box<dyn FnMut(&E)>;

pub struct EventChannel<E> {
    next_id: u64,
    subscribers: SmallVec<[(SubscriptionId, Subscriber<E>); 4]>,
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: SmallVec::new(),
        }
    }
}

impl<E> EventChannel<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns `false` when the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    pub fn emit(&mut self, event: &E) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

/// Outbound channels of a stage.
#[derive(Default)]
pub struct StageEvents {
    pub pointer: EventChannel<PointerEvent>,
    pub selection: EventChannel<SelectionEvent>,
}
