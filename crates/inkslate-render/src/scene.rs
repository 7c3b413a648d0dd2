//! One-pass scene compositing against the host surface.
//!
//! The renderer is stateless apart from its palette: every call repaints
//! the whole frame from the engine's current state. Grid and overlays
//! draw in screen space; elements and transients draw inside the world
//! transform.

use std::f64::consts::{FRAC_PI_6, TAU};

use kurbo::{PathEl, Point, Rect, Vec2};
use peniko::Color;

use inkslate_core::element::line::ARROW_HEAD_LENGTH;
use inkslate_core::element::text::{DEFAULT_FONT_SIZE, FONT_FAMILY};
use inkslate_core::element::{Element, Line, LineKind, Shape, ShapeKind, Text};
use inkslate_core::sketch::Drawable;
use inkslate_core::text_edit::TextEditState;
use inkslate_core::{Engine, Gesture, Marquee, TextMeasurer, Tool, Viewport};

use crate::surface::Surface;

const ERASER_OUTER_RADIUS: f64 = 15.0;
const ERASER_OUTER_WIDTH: f64 = 4.0;
const ERASER_INNER_RADIUS: f64 = 10.0;
const ERASER_INNER_WIDTH: f64 = 2.0;
const ERASER_DOT_RADIUS: f64 = 2.0;

/// Visual palette and tuning for [`SceneRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Grid spacing in world units; drawn at `spacing * zoom` pixels.
    pub grid_spacing: f64,
    pub grid_color: Color,
    /// Dash pattern shared by the marquee, selection and erase previews.
    pub dash: [f64; 2],
    pub marquee_fill: Color,
    pub marquee_stroke: Color,
    pub selection_stroke: Color,
    /// Outline width in screen pixels, independent of zoom.
    pub selection_width: f64,
    /// Outline inflation in screen pixels.
    pub selection_padding: f64,
    pub erase_preview_color: Color,
    pub erase_preview_alpha: f64,
    pub erase_preview_width: f64,
    pub live_path_color: Color,
    pub live_path_width: f64,
    pub eraser_outer_ring: Color,
    pub eraser_ring_active: Color,
    pub eraser_ring_hover: Color,
    pub eraser_dot_active: Color,
    pub eraser_dot_hover: Color,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            grid_spacing: 20.0,
            grid_color: Color::from_rgba8(0, 0, 0, 26),
            dash: [5.0, 5.0],
            marquee_fill: Color::from_rgba8(0, 123, 255, 26),
            marquee_stroke: Color::from_rgba8(0, 123, 255, 204),
            selection_stroke: Color::from_rgba8(0, 123, 255, 204),
            selection_width: 2.0,
            selection_padding: 5.0,
            erase_preview_color: Color::from_rgb8(255, 68, 68),
            erase_preview_alpha: 0.4,
            erase_preview_width: 2.0,
            live_path_color: Color::from_rgb8(255, 0, 0),
            live_path_width: 2.0,
            eraser_outer_ring: Color::from_rgba8(255, 100, 100, 77),
            eraser_ring_active: Color::from_rgba8(255, 50, 50, 230),
            eraser_ring_hover: Color::from_rgba8(255, 100, 100, 179),
            eraser_dot_active: Color::from_rgba8(255, 0, 0, 204),
            eraser_dot_hover: Color::from_rgba8(255, 100, 100, 153),
        }
    }
}

impl RenderOptions {
    pub fn with_grid_spacing(mut self, spacing: f64) -> Self {
        self.grid_spacing = spacing;
        self
    }

    pub fn with_grid_color(mut self, color: Color) -> Self {
        self.grid_color = color;
        self
    }

    pub fn with_dash(mut self, dash: [f64; 2]) -> Self {
        self.dash = dash;
        self
    }

    pub fn with_marquee_colors(mut self, fill: Color, stroke: Color) -> Self {
        self.marquee_fill = fill;
        self.marquee_stroke = stroke;
        self
    }

    pub fn with_selection_stroke(mut self, color: Color) -> Self {
        self.selection_stroke = color;
        self
    }

    pub fn with_selection_width(mut self, width: f64) -> Self {
        self.selection_width = width;
        self
    }

    pub fn with_selection_padding(mut self, padding: f64) -> Self {
        self.selection_padding = padding;
        self
    }

    pub fn with_erase_preview(mut self, color: Color, alpha: f64) -> Self {
        self.erase_preview_color = color;
        self.erase_preview_alpha = alpha;
        self
    }

    pub fn with_live_path(mut self, color: Color, width: f64) -> Self {
        self.live_path_color = color;
        self.live_path_width = width;
        self
    }
}

/// Composites one frame of engine state onto a [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    options: RenderOptions,
}

/// Measures with the surface's current font; the overlay sets that font
/// just before asking for the caret.
struct SurfaceAdvance<'a> {
    surface: &'a dyn Surface,
}

impl TextMeasurer for SurfaceAdvance<'_> {
    fn measure(&self, text: &str, _font_size: f64, _font_family: &str) -> f64 {
        self.surface.measure_text(text)
    }
}

fn now_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Full pass, sampling the wall clock for the caret phase.
    pub fn render(&self, engine: &Engine, surface: &mut dyn Surface) {
        self.render_at(engine, surface, now_millis());
    }

    /// Full pass with an explicit clock, for deterministic frames.
    pub fn render_at(&self, engine: &Engine, surface: &mut dyn Surface, now_ms: u64) {
        surface.clear();
        self.draw_grid(engine.viewport(), surface);

        surface.save();
        surface.translate(engine.viewport().offset);
        surface.scale(engine.viewport().zoom);

        for element in engine.elements() {
            if engine.eraser().is_pending(element.id()) {
                self.draw_erase_preview(element, surface);
            } else {
                self.draw_element(element, surface);
            }
        }

        if let Some(element) = engine.in_progress() {
            self.paint_drawables(element.drawables(), surface);
        }

        match engine.gesture() {
            Gesture::Drawing { path } => self.draw_live_path(path, surface),
            Gesture::Typing { editor } => self.draw_typing_overlay(editor, surface, now_ms),
            _ => {}
        }

        surface.restore();

        if let Gesture::Selecting { marquee } = engine.gesture() {
            self.draw_marquee(marquee, engine.viewport(), surface);
        }
        self.draw_selection_outlines(engine, surface);
        self.draw_eraser_cursor(engine, surface);
    }

    fn draw_grid(&self, viewport: &Viewport, surface: &mut dyn Surface) {
        let spacing = self.options.grid_spacing * viewport.zoom;
        if !spacing.is_finite() || spacing <= 0.0 {
            return;
        }
        let size = surface.size();

        surface.save();
        surface.set_stroke_color(self.options.grid_color);
        surface.set_line_width(1.0);

        // Phase-locked to the pan offset. A negative remainder starts the
        // first line off-screen, which keeps lines fixed to the world
        // while panning.
        let mut x = viewport.offset.x % spacing;
        while x < size.width {
            surface.begin_path();
            surface.move_to(Point::new(x, 0.0));
            surface.line_to(Point::new(x, size.height));
            surface.stroke();
            x += spacing;
        }
        let mut y = viewport.offset.y % spacing;
        while y < size.height {
            surface.begin_path();
            surface.move_to(Point::new(0.0, y));
            surface.line_to(Point::new(size.width, y));
            surface.stroke();
            y += spacing;
        }

        surface.restore();
    }

    fn draw_element(&self, element: &Element, surface: &mut dyn Surface) {
        match element {
            Element::Text(text) => self.draw_text(text, surface),
            other => self.paint_drawables(other.drawables(), surface),
        }
    }

    fn draw_text(&self, text: &Text, surface: &mut dyn Surface) {
        surface.set_font(text.font_size, FONT_FAMILY);
        surface.set_fill_color(Color::BLACK);
        let line_height = text.line_height();
        for (index, line) in text.lines().enumerate() {
            surface.fill_text(
                line,
                Point::new(text.origin.x, text.origin.y + index as f64 * line_height),
            );
        }
    }

    fn paint_drawables(&self, drawables: &[Drawable], surface: &mut dyn Surface) {
        for drawable in drawables {
            self.paint_drawable(drawable, surface);
        }
    }

    fn paint_drawable(&self, drawable: &Drawable, surface: &mut dyn Surface) {
        surface.set_stroke_color(drawable.stroke);
        surface.set_line_width(drawable.stroke_width);
        surface.begin_path();
        let mut last = Point::ZERO;
        for el in drawable.path.elements() {
            match el {
                PathEl::MoveTo(p) => {
                    surface.move_to(*p);
                    last = *p;
                }
                PathEl::LineTo(p) => {
                    surface.line_to(*p);
                    last = *p;
                }
                PathEl::QuadTo(c, p) => {
                    // Degree-elevate; the sketch generator emits cubics only.
                    surface.curve_to(last.lerp(*c, 2.0 / 3.0), p.lerp(*c, 2.0 / 3.0), *p);
                    last = *p;
                }
                PathEl::CurveTo(c1, c2, p) => {
                    surface.curve_to(*c1, *c2, *p);
                    last = *p;
                }
                PathEl::ClosePath => surface.close_path(),
            }
        }
        surface.stroke();
    }

    /// Faded dashed preview of the ideal geometry for elements marked by
    /// a held eraser stroke.
    fn draw_erase_preview(&self, element: &Element, surface: &mut dyn Surface) {
        surface.save();
        surface.set_global_alpha(self.options.erase_preview_alpha);
        surface.set_stroke_color(self.options.erase_preview_color);
        surface.set_line_width(self.options.erase_preview_width);
        surface.set_line_dash(&self.options.dash);

        match element {
            Element::Shape(shape) => self.preview_shape(shape, surface),
            Element::Line(line) => self.preview_line(line, surface),
            Element::Freehand(stroke) => preview_polyline(stroke.points(), surface),
            Element::Text(text) => surface.stroke_rect(text.bounds()),
        }

        surface.restore();
    }

    fn preview_shape(&self, shape: &Shape, surface: &mut dyn Surface) {
        let bounds = shape.bounds();
        match shape.kind {
            ShapeKind::Rectangle => surface.stroke_rect(bounds),
            ShapeKind::Circle => {
                surface.begin_path();
                surface.arc(
                    bounds.center(),
                    shape.width.min(shape.height) / 2.0,
                    0.0,
                    TAU,
                );
                surface.stroke();
            }
            ShapeKind::Diamond => {
                surface.begin_path();
                surface.move_to(Point::new(bounds.x0 + shape.width / 2.0, bounds.y0));
                surface.line_to(Point::new(bounds.x1, bounds.y0 + shape.height / 2.0));
                surface.line_to(Point::new(bounds.x0 + shape.width / 2.0, bounds.y1));
                surface.line_to(Point::new(bounds.x0, bounds.y0 + shape.height / 2.0));
                surface.close_path();
                surface.stroke();
            }
        }
    }

    fn preview_line(&self, line: &Line, surface: &mut dyn Surface) {
        // Zero coordinates read as unset, so such previews are skipped.
        if line.start.x == 0.0
            || line.start.y == 0.0
            || line.end.x == 0.0
            || line.end.y == 0.0
        {
            return;
        }
        surface.begin_path();
        surface.move_to(line.start);
        surface.line_to(line.end);
        surface.stroke();

        if line.kind == LineKind::Arrow {
            let angle = (line.end - line.start).atan2();
            surface.begin_path();
            surface.move_to(line.end);
            surface.line_to(line.end - head_offset(angle - FRAC_PI_6));
            surface.move_to(line.end);
            surface.line_to(line.end - head_offset(angle + FRAC_PI_6));
            surface.stroke();
        }
    }

    fn draw_live_path(&self, path: &[Point], surface: &mut dyn Surface) {
        if path.len() < 2 {
            return;
        }
        surface.save();
        surface.set_stroke_color(self.options.live_path_color);
        surface.set_line_width(self.options.live_path_width);
        surface.set_round_caps(true);
        preview_polyline(path, surface);
        surface.restore();
    }

    fn draw_typing_overlay(
        &self,
        editor: &TextEditState,
        surface: &mut dyn Surface,
        now_ms: u64,
    ) {
        if editor.is_empty() {
            return;
        }
        surface.set_font(DEFAULT_FONT_SIZE, FONT_FAMILY);
        surface.set_fill_color(Color::BLACK);
        let line_height = editor.line_height();
        for (index, line) in editor.lines().enumerate() {
            surface.fill_text(
                line,
                Point::new(
                    editor.position.x,
                    editor.position.y + index as f64 * line_height,
                ),
            );
        }

        if TextEditState::caret_visible(now_ms) {
            let caret = editor.caret_position(&SurfaceAdvance { surface: &*surface });
            surface.set_stroke_color(Color::BLACK);
            surface.set_line_width(1.0);
            surface.begin_path();
            surface.move_to(caret);
            surface.line_to(caret + Vec2::new(0.0, DEFAULT_FONT_SIZE));
            surface.stroke();
        }
    }

    fn draw_marquee(&self, marquee: &Marquee, viewport: &Viewport, surface: &mut dyn Surface) {
        let rect = marquee.rect();
        let top_left = viewport.world_to_screen(Point::new(rect.x0, rect.y0));
        let bottom_right = viewport.world_to_screen(Point::new(rect.x1, rect.y1));
        let screen = Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y);

        surface.save();
        surface.set_fill_color(self.options.marquee_fill);
        surface.set_stroke_color(self.options.marquee_stroke);
        surface.set_line_width(1.0);
        surface.set_line_dash(&self.options.dash);
        surface.fill_rect(screen);
        surface.stroke_rect(screen);
        surface.restore();
    }

    fn draw_selection_outlines(&self, engine: &Engine, surface: &mut dyn Surface) {
        if engine.selection().is_empty() {
            return;
        }
        let viewport = engine.viewport();

        surface.save();
        surface.set_stroke_color(self.options.selection_stroke);
        surface.set_line_width(self.options.selection_width);
        surface.set_line_dash(&self.options.dash);

        for &id in engine.selection().ids() {
            // Stale ids (erased mid-selection) simply match nothing.
            let Some(element) = engine.elements().iter().find(|el| el.id() == id) else {
                continue;
            };
            if let Element::Freehand(stroke) = element {
                if stroke.points().is_empty() {
                    continue;
                }
            }
            let bounds = element.bounds();
            let top_left = viewport.world_to_screen(Point::new(bounds.x0, bounds.y0));
            let pad = self.options.selection_padding;
            surface.stroke_rect(Rect::new(
                top_left.x - pad,
                top_left.y - pad,
                top_left.x + bounds.width() * viewport.zoom + pad,
                top_left.y + bounds.height() * viewport.zoom + pad,
            ));
        }

        surface.restore();
    }

    fn draw_eraser_cursor(&self, engine: &Engine, surface: &mut dyn Surface) {
        if engine.active_tool() != Tool::Eraser {
            return;
        }
        let Some(world) = engine.eraser().cursor() else {
            return;
        };
        let center = engine.viewport().world_to_screen(world);
        let pressed = engine.eraser().pressed();

        surface.save();
        surface.begin_path();
        surface.set_stroke_color(self.options.eraser_outer_ring);
        surface.set_line_width(ERASER_OUTER_WIDTH);
        surface.arc(center, ERASER_OUTER_RADIUS, 0.0, TAU);
        surface.stroke();

        surface.begin_path();
        surface.set_stroke_color(if pressed {
            self.options.eraser_ring_active
        } else {
            self.options.eraser_ring_hover
        });
        surface.set_line_width(ERASER_INNER_WIDTH);
        surface.arc(center, ERASER_INNER_RADIUS, 0.0, TAU);
        surface.stroke();

        surface.begin_path();
        surface.set_fill_color(if pressed {
            self.options.eraser_dot_active
        } else {
            self.options.eraser_dot_hover
        });
        surface.arc(center, ERASER_DOT_RADIUS, 0.0, TAU);
        surface.fill();
        surface.restore();
    }
}

fn preview_polyline(points: &[Point], surface: &mut dyn Surface) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }
    surface.begin_path();
    surface.move_to(*first);
    for p in rest {
        surface.line_to(*p);
    }
    surface.stroke();
}

fn head_offset(angle: f64) -> Vec2 {
    Vec2::new(
        ARROW_HEAD_LENGTH * angle.cos(),
        ARROW_HEAD_LENGTH * angle.sin(),
    )
}
