//! Surface implementation that records operations, for headless tests.

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;

use inkslate_core::TextMeasurer;

use crate::surface::Surface;

/// Approximate per-character advance as a fraction of the font size.
/// Close enough to a real sans-serif for layout assertions.
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// One recorded surface operation, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOp {
    Clear,
    Save,
    Restore,
    Translate(Vec2),
    Scale(f64),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    ClosePath,
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Stroke,
    Fill,
    FillRect(Rect),
    StrokeRect(Rect),
    StrokeColor(Color),
    FillColor(Color),
    LineWidth(f64),
    LineDash(Vec<f64>),
    GlobalAlpha(f64),
    RoundCaps(bool),
    Font {
        size: f64,
        family: String,
    },
    FillText {
        text: String,
        at: Point,
    },
}

/// [`Surface`] that logs every call instead of painting.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    size: Size,
    font_size: f64,
    ops: Vec<RecordedOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            font_size: 16.0,
            ops: Vec::new(),
        }
    }

    /// Everything recorded since creation or the last [`reset`](Self::reset).
    pub fn ops(&self) -> &[RecordedOp] {
        &self.ops
    }

    pub fn reset(&mut self) {
        self.ops.clear();
    }

    /// The text payloads passed to `fill_text`, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RecordedOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Count of recorded ops matching `pred`.
    pub fn count(&self, pred: impl Fn(&RecordedOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    fn push(&mut self, op: RecordedOp) {
        self.ops.push(op);
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.push(RecordedOp::Clear);
    }

    fn save(&mut self) {
        self.push(RecordedOp::Save);
    }

    fn restore(&mut self) {
        self.push(RecordedOp::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.push(RecordedOp::Translate(offset));
    }

    fn scale(&mut self, factor: f64) {
        self.push(RecordedOp::Scale(factor));
    }

    fn begin_path(&mut self) {
        self.push(RecordedOp::BeginPath);
    }

    fn move_to(&mut self, p: Point) {
        self.push(RecordedOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.push(RecordedOp::LineTo(p));
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.push(RecordedOp::CurveTo(c1, c2, p));
    }

    fn close_path(&mut self) {
        self.push(RecordedOp::ClosePath);
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        self.push(RecordedOp::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn stroke(&mut self) {
        self.push(RecordedOp::Stroke);
    }

    fn fill(&mut self) {
        self.push(RecordedOp::Fill);
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.push(RecordedOp::FillRect(rect));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.push(RecordedOp::StrokeRect(rect));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.push(RecordedOp::StrokeColor(color));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.push(RecordedOp::FillColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(RecordedOp::LineWidth(width));
    }

    fn set_line_dash(&mut self, dash: &[f64]) {
        self.push(RecordedOp::LineDash(dash.to_vec()));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.push(RecordedOp::GlobalAlpha(alpha));
    }

    fn set_round_caps(&mut self, round: bool) {
        self.push(RecordedOp::RoundCaps(round));
    }

    fn set_font(&mut self, size: f64, family: &str) {
        self.font_size = size;
        self.push(RecordedOp::Font {
            size,
            family: family.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        self.push(RecordedOp::FillText {
            text: text.to_string(),
            at,
        });
    }

    fn measure_text(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * CHAR_WIDTH_FACTOR
    }
}

/// [`TextMeasurer`] with the same fixed-advance approximation as
/// [`RecordingSurface`], for driving the engine headlessly.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharWidthMeasurer;

impl TextMeasurer for CharWidthMeasurer {
    fn measure(&self, text: &str, font_size: f64, _font_family: &str) -> f64 {
        text.chars().count() as f64 * font_size * CHAR_WIDTH_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_in_order() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        surface.clear();
        surface.begin_path();
        surface.move_to(Point::new(1.0, 2.0));
        surface.line_to(Point::new(3.0, 4.0));
        surface.stroke();

        assert_eq!(
            surface.ops(),
            &[
                RecordedOp::Clear,
                RecordedOp::BeginPath,
                RecordedOp::MoveTo(Point::new(1.0, 2.0)),
                RecordedOp::LineTo(Point::new(3.0, 4.0)),
                RecordedOp::Stroke,
            ]
        );
        assert_eq!(surface.size(), Size::new(800.0, 600.0));

        surface.reset();
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_measure_follows_current_font() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        assert!((surface.measure_text("hi") - 2.0 * 16.0 * 0.6).abs() < 1e-10);
        surface.set_font(32.0, "Arial");
        assert!((surface.measure_text("hi") - 2.0 * 32.0 * 0.6).abs() < 1e-10);
    }

    #[test]
    fn test_measurer_matches_surface_approximation() {
        let surface = RecordingSurface::new(100.0, 100.0);
        let width = CharWidthMeasurer.measure("abc", 16.0, "Arial");
        assert!((width - surface.measure_text("abc")).abs() < 1e-10);
        assert_eq!(CharWidthMeasurer.measure("", 16.0, "Arial"), 0.0);
    }

    #[test]
    fn test_texts_extracts_fill_text_payloads() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        surface.fill_text("one", Point::ZERO);
        surface.stroke();
        surface.fill_text("two", Point::new(0.0, 19.2));
        assert_eq!(surface.texts(), vec!["one", "two"]);
        assert_eq!(
            surface.count(|op| matches!(op, RecordedOp::FillText { .. })),
            2
        );
    }
}
