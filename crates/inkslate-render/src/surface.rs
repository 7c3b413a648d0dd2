//! Host paint boundary.

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;

/// Immediate-mode 2D drawing contract provided by the host.
///
/// Mirrors the standard canvas context: path construction, stroke/fill
/// state, a save/restore stack covering state and transform, and text.
/// All coordinates and sizes are logical pixels; device-pixel-ratio
/// scaling stays on the host side of this boundary, applied when the
/// backing store is resized.
pub trait Surface {
    /// Logical drawing size in pixels.
    fn size(&self) -> Size;

    /// Wipe the whole surface to transparent/background.
    fn clear(&mut self);

    /// Push the current state (colors, width, dash, alpha, font, caps)
    /// and transform.
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn scale(&mut self, factor: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn curve_to(&mut self, c1: Point, c2: Point, p: Point);
    fn close_path(&mut self);
    /// Append a circular arc around `center`, angles in radians.
    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64);
    fn stroke(&mut self);
    fn fill(&mut self);

    fn fill_rect(&mut self, rect: Rect);
    fn stroke_rect(&mut self, rect: Rect);

    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);
    /// Dash pattern for subsequent strokes; empty means solid.
    fn set_line_dash(&mut self, dash: &[f64]);
    fn set_global_alpha(&mut self, alpha: f64);
    /// Round caps and joins for subsequent polyline strokes.
    fn set_round_caps(&mut self, round: bool);

    fn set_font(&mut self, size: f64, family: &str);
    /// Draw one line of text anchored at the top-left of its line box.
    fn fill_text(&mut self, text: &str, at: Point);
    /// Advance width of `text` under the current font.
    fn measure_text(&self, text: &str) -> f64;
}
