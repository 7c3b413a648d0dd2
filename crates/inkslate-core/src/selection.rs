//! Selected-element tracking and the marquee rectangle.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::element::ElementId;

/// The set of selected element ids, in the order they were selected.
///
/// Ids are not validated against the collection; lookups skip ids whose
/// element has vanished (erased while selected, for example).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    /// Add `id` if not already selected.
    pub fn insert(&mut self, id: ElementId) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    /// Make `id` the only selected element.
    pub fn replace_with(&mut self, id: ElementId) {
        self.ids.clear();
        self.ids.push(id);
    }

    pub fn remove(&mut self, id: ElementId) {
        self.ids.retain(|&sel| sel != id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.ids.iter().copied()
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }
}

/// The drag-select rectangle, kept as the anchor corner plus the corner
/// under the cursor. Normalization happens on read so dragging in any
/// direction works.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marquee {
    pub start: Point,
    pub end: Point,
}

impl Marquee {
    /// A zero-size marquee anchored where the drag began.
    pub fn new(start: Point) -> Self {
        Self { start, end: start }
    }

    /// The normalized world rect between the two corners.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let a = ElementId::next();
        let b = ElementId::next();
        let mut sel = Selection::new();
        sel.insert(a);
        sel.insert(b);
        sel.insert(a);
        assert_eq!(sel.len(), 2);
        assert!(sel.contains(a));
        assert!(sel.contains(b));
    }

    #[test]
    fn test_replace_keeps_only_the_new_id() {
        let a = ElementId::next();
        let b = ElementId::next();
        let mut sel = Selection::new();
        sel.insert(a);
        sel.replace_with(b);
        assert_eq!(sel.len(), 1);
        assert!(!sel.contains(a));
        assert!(sel.contains(b));
    }

    #[test]
    fn test_remove_and_clear() {
        let a = ElementId::next();
        let b = ElementId::next();
        let mut sel = Selection::new();
        sel.insert(a);
        sel.insert(b);
        sel.remove(a);
        assert_eq!(sel.ids(), &[b]);
        sel.clear();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_marquee_normalizes_any_drag_direction() {
        let mut m = Marquee::new(Point::new(50.0, 50.0));
        m.end = Point::new(10.0, 80.0);
        let r = m.rect();
        assert!((r.x0 - 10.0).abs() < f64::EPSILON);
        assert!((r.y0 - 50.0).abs() < f64::EPSILON);
        assert!((r.x1 - 50.0).abs() < f64::EPSILON);
        assert!((r.y1 - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fresh_marquee_is_zero_size() {
        let m = Marquee::new(Point::new(7.0, 9.0));
        let r = m.rect();
        assert!((r.width()).abs() < f64::EPSILON);
        assert!((r.height()).abs() < f64::EPSILON);
    }
}
