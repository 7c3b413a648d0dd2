//! Pending-erase tracking for the eraser tool.
//!
//! Elements touched during an eraser stroke are only marked; they keep
//! rendering (faded) until the pointer is released, when the whole batch
//! is deleted at once.

use kurbo::Point;

use crate::element::ElementId;

/// Eraser stroke state: the world cursor position for the ring cursor,
/// whether the stroke is pressed, and the ids marked so far.
#[derive(Debug, Clone, Default)]
pub struct EraserTracker {
    cursor: Option<Point>,
    pressed: bool,
    pending: Vec<ElementId>,
}

impl EraserTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the ring cursor draws, if the pointer is over the canvas.
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn set_cursor(&mut self, world: Point) {
        self.cursor = Some(world);
    }

    pub fn pressed(&self) -> bool {
        self.pressed
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// Mark an element for deletion at stroke end. Marking is monotone
    /// during a stroke and re-marking is a no-op.
    pub fn mark(&mut self, id: ElementId) {
        if !self.is_pending(id) {
            self.pending.push(id);
        }
    }

    pub fn is_pending(&self, id: ElementId) -> bool {
        self.pending.contains(&id)
    }

    pub fn pending(&self) -> &[ElementId] {
        &self.pending
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain the marks for the end-of-stroke batch delete. The cursor
    /// position is cleared with them; it comes back on the next move.
    pub fn take_pending(&mut self) -> Vec<ElementId> {
        self.pressed = false;
        self.cursor = None;
        std::mem::take(&mut self.pending)
    }

    /// Drop all marks and stroke state without deleting anything.
    pub fn reset(&mut self) {
        self.pressed = false;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marking_is_idempotent() {
        let a = ElementId::next();
        let b = ElementId::next();
        let mut tracker = EraserTracker::new();
        tracker.mark(a);
        tracker.mark(b);
        tracker.mark(a);
        tracker.mark(a);
        assert_eq!(tracker.pending(), &[a, b]);
    }

    #[test]
    fn test_take_pending_drains_and_releases() {
        let a = ElementId::next();
        let mut tracker = EraserTracker::new();
        tracker.set_cursor(Point::new(5.0, 5.0));
        tracker.set_pressed(true);
        tracker.mark(a);

        let batch = tracker.take_pending();
        assert_eq!(batch, vec![a]);
        assert!(!tracker.has_pending());
        assert!(!tracker.pressed());
        assert!(tracker.cursor().is_none());
    }

    #[test]
    fn test_reset_discards_marks_but_keeps_cursor() {
        let a = ElementId::next();
        let mut tracker = EraserTracker::new();
        tracker.set_cursor(Point::new(1.0, 2.0));
        tracker.set_pressed(true);
        tracker.mark(a);

        tracker.reset();
        assert!(!tracker.has_pending());
        assert!(!tracker.pressed());
        assert_eq!(tracker.cursor(), Some(Point::new(1.0, 2.0)));
    }
}
