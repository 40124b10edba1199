//! Edit-session hooks and transform undo/redo.
//!
//! A handle gesture is bracketed by `init_command` (gesture start) and
//! `check_command` (gesture end) on the selected entity's owner. Owners that
//! keep no history simply don't register the capability.
//!
//! `TransformHistory` is the stock implementation: it snapshots the transform
//! when the gesture starts and, when it ends, records one undo step if the
//! transform actually changed. Snapshots are MessagePack bytes, so the
//! comparison is exact and cheap to store.

use stage_core::EntityTransform;
use std::cell::RefCell;
use std::rc::Rc;

/// Optional edit-bracket capability of an entity's owner.
pub trait EditCommands {
    /// A gesture on the entity is starting.
    fn init_command(&mut self, transform: &EntityTransform);
    /// The gesture ended; decide whether it produced an undoable change.
    fn check_command(&mut self, transform: &EntityTransform);
}

/// Shared handles let the owner keep the history while the stage drives it.
impl<T: EditCommands> EditCommands for Rc<RefCell<T>> {
    fn init_command(&mut self, transform: &EntityTransform) {
        self.borrow_mut().init_command(transform);
    }

    fn check_command(&mut self, transform: &EntityTransform) {
        self.borrow_mut().check_command(transform);
    }
}

/// One recorded gesture.
#[derive(Debug, Clone)]
pub struct TransformCommand {
    before: Vec<u8>,
    after: Vec<u8>,
    pub description: String,
}

impl TransformCommand {
    pub fn before(&self) -> Option<EntityTransform> {
        decode(&self.before)
    }

    pub fn after(&self) -> Option<EntityTransform> {
        decode(&self.after)
    }
}

fn encode(transform: &EntityTransform) -> Option<Vec<u8>> {
    match rmp_serde::to_vec(transform) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("failed to snapshot transform: {e}");
            None
        }
    }
}

fn decode(bytes: &[u8]) -> Option<EntityTransform> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| log::warn!("failed to restore transform snapshot: {e}"))
        .ok()
}

/// Undo/redo stack of transform edits for one entity.
pub struct TransformHistory {
    undo_stack: Vec<TransformCommand>,
    redo_stack: Vec<TransformCommand>,
    max_depth: usize,
    /// Snapshot captured by `init_command`.
    pending: Option<Vec<u8>>,
}

impl TransformHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            pending: None,
        }
    }

    /// Convenience for sharing with a stage.
    pub fn shared(max_depth: usize) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(max_depth)))
    }

    /// Pop the last edit and return the transform to restore.
    pub fn undo(&mut self) -> Option<EntityTransform> {
        let cmd = self.undo_stack.pop()?;
        let restored = cmd.before();
        self.redo_stack.push(cmd);
        restored
    }

    /// Re-apply the last undone edit and return the transform to restore.
    pub fn redo(&mut self) -> Option<EntityTransform> {
        let cmd = self.redo_stack.pop()?;
        let restored = cmd.after();
        self.undo_stack.push(cmd);
        restored
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }
}

impl EditCommands for TransformHistory {
    fn init_command(&mut self, transform: &EntityTransform) {
        self.pending = encode(transform);
    }

    fn check_command(&mut self, transform: &EntityTransform) {
        let Some(before) = self.pending.take() else {
            return;
        };
        let Some(after) = encode(transform) else {
            return;
        };
        // Only push if the gesture actually changed something
        if before == after {
            return;
        }
        self.undo_stack.push(TransformCommand {
            before,
            after,
            description: "transform entity".to_string(),
        });
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unchanged_gesture_records_nothing() {
        let mut history = TransformHistory::new(10);
        let t = EntityTransform::new(10.0, 10.0);
        history.init_command(&t);
        history.check_command(&t);
        assert!(!history.can_undo());
    }

    #[test]
    fn changed_gesture_can_be_undone_and_redone() {
        let mut history = TransformHistory::new(10);
        let before = EntityTransform::new(10.0, 10.0);
        let after = before.with_position(5.0, -5.0);
        history.init_command(&before);
        history.check_command(&after);

        assert_eq!(history.undo(), Some(before));
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(after));
    }

    #[test]
    fn check_without_init_is_ignored() {
        let mut history = TransformHistory::new(10);
        history.check_command(&EntityTransform::new(1.0, 1.0));
        assert!(history.is_empty());
    }

    #[test]
    fn depth_is_bounded() {
        let mut history = TransformHistory::new(2);
        let mut t = EntityTransform::new(10.0, 10.0);
        for i in 0..4 {
            history.init_command(&t);
            t.x = f64::from(i + 1);
            history.check_command(&t);
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo().map(|t| t.x), Some(3.0));
    }
}
