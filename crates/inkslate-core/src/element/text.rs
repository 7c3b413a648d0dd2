//! Text elements, frozen to their measured box at commit time.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::{ElementId, TextMeasurer};

/// Default font size in world units.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Font family requested from the host.
pub const FONT_FAMILY: &str = "Arial";
/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Placeholder box for text with no content.
pub const EMPTY_TEXT_SIZE: (f64, f64) = (50.0, 20.0);

/// Multi-line text anchored at its top-left corner. The box is measured
/// once, when the element is created, and only moves afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    id: ElementId,
    pub origin: Point,
    content: String,
    pub font_size: f64,
    pub width: f64,
    pub height: f64,
}

impl Text {
    /// Create a text element, measuring its box with the host measurer:
    /// widest line by measured advance, line count times the line height.
    pub fn new(origin: Point, content: String, measurer: &dyn TextMeasurer) -> Self {
        let font_size = DEFAULT_FONT_SIZE;
        let (width, height) = if content.is_empty() {
            EMPTY_TEXT_SIZE
        } else {
            let lines: Vec<&str> = content.split('\n').collect();
            let max_width = lines
                .iter()
                .map(|line| measurer.measure(line, font_size, FONT_FAMILY))
                .fold(0.0, f64::max);
            (max_width, lines.len() as f64 * font_size * LINE_HEIGHT_FACTOR)
        };
        Self {
            id: ElementId::next(),
            origin,
            content,
            font_size,
            width,
            height,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The lines as they are painted, split on `\n`.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }

    /// Inclusive containment in the measured box.
    pub fn hit_test(&self, point: Point) -> bool {
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.origin += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-advance stand-in for the host's text metrics.
    struct FixedAdvance;

    impl TextMeasurer for FixedAdvance {
        fn measure(&self, text: &str, font_size: f64, _font_family: &str) -> f64 {
            text.chars().count() as f64 * font_size * 0.6
        }
    }

    #[test]
    fn test_box_uses_widest_line_and_line_count() {
        let text = Text::new(
            Point::new(10.0, 20.0),
            "hi\nlonger line\nmid".to_string(),
            &FixedAdvance,
        );
        // 11 chars * 16 * 0.6
        assert!((text.width - 105.6).abs() < 1e-10);
        // 3 lines * 16 * 1.2
        assert!((text.height - 57.6).abs() < 1e-10);
        let b = text.bounds();
        assert!((b.x1 - 115.6).abs() < 1e-10);
        assert!((b.y1 - 77.6).abs() < 1e-10);
    }

    #[test]
    fn test_empty_content_gets_placeholder_box() {
        let text = Text::new(Point::new(0.0, 0.0), String::new(), &FixedAdvance);
        assert!((text.width - 50.0).abs() < f64::EPSILON);
        assert!((text.height - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trailing_newline_counts_as_a_line() {
        let text = Text::new(Point::new(0.0, 0.0), "a\n".to_string(), &FixedAdvance);
        // split keeps the trailing empty line, as the painter does.
        assert!((text.height - 2.0 * 16.0 * 1.2).abs() < 1e-10);
    }

    #[test]
    fn test_hit_respects_measured_box() {
        let text = Text::new(Point::new(100.0, 100.0), "abcde".to_string(), &FixedAdvance);
        assert!(text.hit_test(Point::new(100.0, 100.0)));
        assert!(text.hit_test(Point::new(100.0 + text.width, 100.0 + text.height)));
        assert!(!text.hit_test(Point::new(99.9, 100.0)));
    }

    #[test]
    fn test_translate_keeps_the_box_size() {
        let mut text = Text::new(Point::new(0.0, 0.0), "abc".to_string(), &FixedAdvance);
        let (w, h) = (text.width, text.height);
        text.translate(Vec2::new(12.0, 8.0));
        assert_eq!(text.origin, Point::new(12.0, 8.0));
        assert!((text.width - w).abs() < f64::EPSILON);
        assert!((text.height - h).abs() < f64::EPSILON);
    }
}
