//! Straight line elements: plain dashes and arrows.

use std::f64::consts::FRAC_PI_6;

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::{ElementId, HIT_TOLERANCE};
use crate::sketch::{self, Drawable, SketchOptions};

/// Arrow head length in world units.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    /// Shaft shortened by the head length, plus a triangular head at the tip.
    Arrow,
    /// A bare segment.
    Dash,
}

impl LineKind {
    pub fn name(&self) -> &'static str {
        match self {
            LineKind::Arrow => "arrow",
            LineKind::Dash => "dash",
        }
    }
}

/// A straight element between two world points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    id: ElementId,
    pub kind: LineKind,
    pub start: Point,
    pub end: Point,
    seed: u64,
    #[serde(skip)]
    drawables: Vec<Drawable>,
}

impl Line {
    pub fn new(kind: LineKind, start: Point, end: Point) -> Self {
        let mut line = Self {
            id: ElementId::next(),
            kind,
            start,
            end,
            seed: sketch::random_seed(),
            drawables: Vec::new(),
        };
        line.rebuild_sketch();
        line
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Move the free endpoint while the line is being dragged out.
    pub fn set_end(&mut self, end: Point) {
        self.end = end;
        self.rebuild_sketch();
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    /// On-segment test via the triangle inequality: the point hits when
    /// the detour through it adds less than the tolerance to the segment
    /// length.
    pub fn hit_test(&self, point: Point) -> bool {
        let direct = self.start.distance(self.end);
        let detour = self.start.distance(point) + point.distance(self.end);
        (direct - detour).abs() < HIT_TOLERANCE
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
        self.rebuild_sketch();
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn rebuild_sketch(&mut self) {
        let options = SketchOptions {
            seed: self.seed,
            ..SketchOptions::default()
        };
        self.drawables = match self.kind {
            LineKind::Dash => vec![Drawable::line(self.start, self.end, &options)],
            LineKind::Arrow => {
                let angle = (self.end.y - self.start.y).atan2(self.end.x - self.start.x);
                let shaft_length = self.length() - ARROW_HEAD_LENGTH;
                let shaft_end = Point::new(
                    self.start.x + angle.cos() * shaft_length,
                    self.start.y + angle.sin() * shaft_length,
                );
                let head = [
                    self.end,
                    Point::new(
                        self.end.x - ARROW_HEAD_LENGTH * (angle - FRAC_PI_6).cos(),
                        self.end.y - ARROW_HEAD_LENGTH * (angle - FRAC_PI_6).sin(),
                    ),
                    Point::new(
                        self.end.x - ARROW_HEAD_LENGTH * (angle + FRAC_PI_6).cos(),
                        self.end.y - ARROW_HEAD_LENGTH * (angle + FRAC_PI_6).sin(),
                    ),
                ];
                vec![
                    Drawable::line(self.start, shaft_end, &options),
                    Drawable::polygon(&head, &options),
                ]
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_on_segment_and_near_it() {
        let line = Line::new(LineKind::Dash, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 0.0)));
        assert!(line.hit_test(Point::new(50.0, 5.0)));
        assert!(!line.hit_test(Point::new(50.0, 40.0)));
        // Beyond the endpoints the detour grows fast.
        assert!(!line.hit_test(Point::new(160.0, 0.0)));
    }

    #[test]
    fn test_bounds_normalize_endpoint_order() {
        let line = Line::new(LineKind::Dash, Point::new(80.0, 10.0), Point::new(20.0, 60.0));
        let b = line.bounds();
        assert!((b.x0 - 20.0).abs() < f64::EPSILON);
        assert!((b.y0 - 10.0).abs() < f64::EPSILON);
        assert!((b.x1 - 80.0).abs() < f64::EPSILON);
        assert!((b.y1 - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_arrow_builds_shaft_and_head() {
        let line = Line::new(LineKind::Arrow, Point::new(10.0, 10.0), Point::new(110.0, 10.0));
        assert_eq!(line.drawables().len(), 2);
        let dash = Line::new(LineKind::Dash, Point::new(10.0, 10.0), Point::new(110.0, 10.0));
        assert_eq!(dash.drawables().len(), 1);
    }

    #[test]
    fn test_translate_moves_both_endpoints() {
        let mut line = Line::new(LineKind::Arrow, Point::new(0.0, 0.0), Point::new(30.0, 40.0));
        line.translate(Vec2::new(5.0, 6.0));
        assert_eq!(line.start, Point::new(5.0, 6.0));
        assert_eq!(line.end, Point::new(35.0, 46.0));
        assert!((line.length() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_set_end_regenerates_with_same_seed() {
        let mut line = Line::new(LineKind::Dash, Point::new(1.0, 1.0), Point::new(50.0, 1.0));
        let before = line.drawables().to_vec();
        line.set_end(Point::new(90.0, 20.0));
        assert_ne!(line.drawables(), &before[..]);
        line.set_end(Point::new(50.0, 1.0));
        assert_eq!(line.drawables(), &before[..]);
    }
}
