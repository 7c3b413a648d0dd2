//! Freehand strokes captured by the draw tool.

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};

use super::{point_to_segment_dist, ElementId, HIT_TOLERANCE};
use crate::sketch::{self, Drawable, SketchOptions};

/// Freehand strokes paint red at this width.
pub const FREEHAND_STROKE_WIDTH: f64 = 2.0;

pub(crate) fn freehand_stroke_color() -> Color {
    Color::from_rgb8(255, 0, 0)
}

/// An ordered run of world points, one hand-drawn segment per
/// consecutive pair. Committed strokes always have at least two points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Freehand {
    id: ElementId,
    points: Vec<Point>,
    seed: u64,
    #[serde(skip)]
    drawables: Vec<Drawable>,
}

impl Freehand {
    pub fn new(points: Vec<Point>) -> Self {
        let mut stroke = Self {
            id: ElementId::next(),
            points,
            seed: sketch::random_seed(),
            drawables: Vec::new(),
        };
        stroke.rebuild_sketch();
        stroke
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Min/max fold over the points. Empty strokes report a zero rect;
    /// they never survive commit.
    pub fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |r, p| {
            Rect::new(r.x0.min(p.x), r.y0.min(p.y), r.x1.max(p.x), r.y1.max(p.y))
        })
    }

    /// A point hits the stroke when it comes within the tolerance of any
    /// consecutive segment.
    pub fn hit_test(&self, point: Point) -> bool {
        self.points
            .windows(2)
            .any(|w| point_to_segment_dist(point, w[0], w[1]) < HIT_TOLERANCE)
    }

    pub fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
        self.rebuild_sketch();
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn rebuild_sketch(&mut self) {
        // One drawable per segment, each with its own derived seed so
        // segments do not all wobble the same way.
        self.drawables = self
            .points
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let options = SketchOptions {
                    stroke: freehand_stroke_color(),
                    stroke_width: FREEHAND_STROKE_WIDTH,
                    seed: self.seed.wrapping_add(i as u64 * 99991),
                    ..SketchOptions::default()
                };
                Drawable::line(w[0], w[1], &options)
            })
            .collect();
    }
}
