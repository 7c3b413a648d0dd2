//! Canvas elements: the committed content of the board.
//!
//! An [`Element`] is one of four families (shape, line, freehand stroke,
//! text), each carrying normalized world geometry, a stable sketch seed and
//! a cached set of hand-drawn [`Drawable`]s. The cache is rebuilt whenever
//! geometry changes, so it never lags behind at draw time.

pub mod freehand;
pub mod line;
pub mod shape;
pub mod text;

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::sketch::Drawable;

pub use freehand::Freehand;
pub use line::{Line, LineKind};
pub use shape::{Shape, ShapeKind};
pub use text::Text;

/// World-unit slack used when hit testing lines and freehand strokes.
pub const HIT_TOLERANCE: f64 = 5.0;

/// Unique element identifier: epoch milliseconds in the high bits, a
/// per-process counter in the low 16, so ids are unique and sort by
/// creation time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ElementId(u64);

impl ElementId {
    pub fn next() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};

        static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

        let millis = web_time::SystemTime::now()
            .duration_since(web_time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
        Self((millis << 16) | counter)
    }
}

/// Host-provided text measurement, usually backed by the platform canvas's
/// `measureText`. Returns the advance width of one line in world units.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font_size: f64, font_family: &str) -> f64;
}

/// One element on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Element {
    Shape(Shape),
    Line(Line),
    Freehand(Freehand),
    Text(Text),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Element::Shape(e) => e.id(),
            Element::Line(e) => e.id(),
            Element::Freehand(e) => e.id(),
            Element::Text(e) => e.id(),
        }
    }

    /// Axis-aligned bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Element::Shape(e) => e.bounds(),
            Element::Line(e) => e.bounds(),
            Element::Freehand(e) => e.bounds(),
            Element::Text(e) => e.bounds(),
        }
    }

    /// Point hit test in world coordinates.
    pub fn hit_test(&self, point: Point) -> bool {
        match self {
            Element::Shape(e) => e.hit_test(point),
            Element::Line(e) => e.hit_test(point),
            Element::Freehand(e) => e.hit_test(point),
            Element::Text(e) => e.hit_test(point),
        }
    }

    /// True when the whole bounding box lies inside `rect` (inclusive
    /// edges). Elements with no usable geometry are never contained.
    pub fn contained_in(&self, rect: Rect) -> bool {
        if let Element::Freehand(f) = self {
            if f.points().is_empty() {
                return false;
            }
        }
        let b = self.bounds();
        rect.x0 <= b.x0 && b.x1 <= rect.x1 && rect.y0 <= b.y0 && b.y1 <= rect.y1
    }

    /// Move the whole element and rebuild its sketch cache.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Element::Shape(e) => e.translate(delta),
            Element::Line(e) => e.translate(delta),
            Element::Freehand(e) => e.translate(delta),
            Element::Text(e) => e.translate(delta),
        }
    }

    /// The point drags are anchored to: shape/text top-left corner, line
    /// start, first point of a freehand stroke.
    pub fn origin(&self) -> Point {
        match self {
            Element::Shape(e) => e.origin,
            Element::Line(e) => e.start,
            Element::Freehand(e) => e.points().first().copied().unwrap_or(Point::ZERO),
            Element::Text(e) => e.origin,
        }
    }

    /// Cached hand-drawn strokes. Empty for text.
    pub fn drawables(&self) -> &[Drawable] {
        match self {
            Element::Shape(e) => e.drawables(),
            Element::Line(e) => e.drawables(),
            Element::Freehand(e) => e.drawables(),
            Element::Text(_) => &[],
        }
    }

    /// Regenerate the sketch cache from the current geometry and seed.
    /// Needed after deserialization, where caches are skipped.
    pub fn rebuild_sketch(&mut self) {
        match self {
            Element::Shape(e) => e.rebuild_sketch(),
            Element::Line(e) => e.rebuild_sketch(),
            Element::Freehand(e) => e.rebuild_sketch(),
            Element::Text(_) => {}
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Shape(e) => e.kind.name(),
            Element::Line(e) => e.kind.name(),
            Element::Freehand(_) => "freehand",
            Element::Text(_) => "text",
        }
    }
}

/// Distance from `point` to the segment `a..b`, with the projection
/// clamped to the segment.
pub(crate) fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let proj = a + ab * t;
    point.distance(proj)
}
