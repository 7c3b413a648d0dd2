//! Rectangle, circle and diamond elements.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::ElementId;
use crate::sketch::{self, Drawable, SketchOptions};

/// Which outline a [`Shape`] draws inside its normalized box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    /// Inscribed in the box: centered, radius `min(width, height) / 2`.
    Circle,
    /// Polygon through the four edge midpoints of the box.
    Diamond,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Diamond => "diamond",
        }
    }
}

/// A boxy element: normalized origin (top-left) plus non-negative extent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    id: ElementId,
    pub kind: ShapeKind,
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    seed: u64,
    #[serde(skip)]
    drawables: Vec<Drawable>,
}

impl Shape {
    /// Build a shape spanning the rectangle between two corners, dragged
    /// out in any direction. Negative spans flip so `origin` is the min
    /// corner and the extent is non-negative.
    pub fn from_corners(kind: ShapeKind, a: Point, b: Point) -> Self {
        let mut shape = Self {
            id: ElementId::next(),
            kind,
            origin: Point::ZERO,
            width: 0.0,
            height: 0.0,
            seed: sketch::random_seed(),
            drawables: Vec::new(),
        };
        shape.set_corners(a, b);
        shape
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Renormalize from a fixed anchor corner and the moving corner, then
    /// rebuild the sketch. Used while the shape is being dragged out.
    pub fn set_corners(&mut self, a: Point, b: Point) {
        self.origin = Point::new(a.x.min(b.x), a.y.min(b.y));
        self.width = (b.x - a.x).abs();
        self.height = (b.y - a.y).abs();
        self.rebuild_sketch();
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }

    /// Inclusive bounding-box containment, whatever the outline kind.
    pub fn hit_test(&self, point: Point) -> bool {
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.origin += delta;
        self.rebuild_sketch();
    }

    /// A shape the user never dragged out carries no area and is dropped
    /// instead of committed.
    pub fn has_zero_extent(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn rebuild_sketch(&mut self) {
        let options = SketchOptions {
            seed: self.seed,
            ..SketchOptions::default()
        };
        let drawable = match self.kind {
            ShapeKind::Rectangle => Drawable::rectangle(self.bounds(), &options),
            ShapeKind::Circle => {
                let center = self.bounds().center();
                let radius = self.width.min(self.height) / 2.0;
                Drawable::circle(center, radius, &options)
            }
            ShapeKind::Diamond => {
                let (x, y) = (self.origin.x, self.origin.y);
                let (w, h) = (self.width, self.height);
                Drawable::polygon(
                    &[
                        Point::new(x + w / 2.0, y),
                        Point::new(x + w, y + h / 2.0),
                        Point::new(x + w / 2.0, y + h),
                        Point::new(x, y + h / 2.0),
                    ],
                    &options,
                )
            }
        };
        self.drawables = vec![drawable];
    }
}
