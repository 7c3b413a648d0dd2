//! World/screen mapping for the infinite canvas.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor reachable through wheel or pinch input.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor reachable through wheel or pinch input.
pub const MAX_ZOOM: f64 = 5.0;
/// Wheel step applied when scrolling toward the user.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;
/// Wheel step applied when scrolling away from the user.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Pan/zoom state mapping world coordinates to screen pixels.
///
/// `offset` is the screen position of the world origin and `zoom` scales
/// world units to screen pixels, so
/// `screen = world * zoom + offset` in both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub offset: Vec2,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a screen position to world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.x) / self.zoom,
            (screen.y - self.offset.y) / self.zoom,
        )
    }

    /// Convert a world position to screen coordinates.
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.zoom + self.offset.x,
            world.y * self.zoom + self.offset.y,
        )
    }

    /// Multiply the zoom by `factor`, clamped to [`MIN_ZOOM`, `MAX_ZOOM`],
    /// keeping the world point under `pivot` (screen px) stationary.
    pub fn zoom_at(&mut self, pivot: Point, factor: f64) {
        self.set_zoom_at(pivot, self.zoom * factor);
    }

    /// Set the zoom to an absolute value, clamped, holding `pivot` fixed.
    ///
    /// The offset correction `offset' = pivot - (pivot - offset) * ratio`
    /// keeps `screen_to_world(pivot)` constant across the change.
    pub fn set_zoom_at(&mut self, pivot: Point, zoom: f64) {
        let new_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = new_zoom / self.zoom;
        self.offset = pivot.to_vec2() - (pivot.to_vec2() - self.offset) * ratio;
        self.zoom = new_zoom;
    }

    /// Apply one wheel step at `pivot`: scrolling toward the user
    /// (positive `delta_y`) zooms out, anything else zooms in.
    pub fn wheel_zoom(&mut self, pivot: Point, delta_y: f64) {
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        self.zoom_at(pivot, factor);
    }

    /// Return to the origin at 100% zoom.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Zoom as a percentage, for the host's indicator read-out.
    pub fn zoom_percent(&self) -> f64 {
        self.zoom * 100.0
    }
}
