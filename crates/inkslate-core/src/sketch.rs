//! Hand-drawn stroke generation.
//!
//! Port of the rough.js line/ellipse algorithms: every segment is replaced
//! by one or two slightly offset cubic curves, ellipses by a randomized
//! point ring with a curve fitted through it. All randomness comes from a
//! seeded [`StdRng`], so the same options and seed always produce the same
//! path. Elements cache the generated [`Drawable`]s and keep their seed, so
//! a shape keeps its exact look while it is dragged around.

use std::f64::consts::PI;

use kurbo::{BezPath, Point, Rect};
use peniko::Color;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Tuning knobs for the hand-drawn look, plus the stroke style the
/// generated path should be painted with.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchOptions {
    /// How far points may stray from the ideal geometry.
    pub roughness: f64,
    /// Strength of the mid-segment bulge on straight lines.
    pub bowing: f64,
    /// Upper bound for random point displacement, in world units.
    pub max_randomness_offset: f64,
    /// Minimum number of samples around an ellipse.
    pub curve_step_count: u32,
    /// 0.0 draws loose curves through the ellipse ring, 1.0 draws chords.
    pub curve_tightness: f64,
    /// How closely the ellipse ring hugs the ideal radius (1.0 = exact).
    pub curve_fitting: f64,
    /// Draw a second, lighter pass over every stroke.
    pub multi_stroke: bool,
    pub stroke: Color,
    pub stroke_width: f64,
    pub seed: u64,
}

impl Default for SketchOptions {
    fn default() -> Self {
        Self {
            roughness: 1.0,
            bowing: 1.0,
            max_randomness_offset: 2.0,
            curve_step_count: 9,
            curve_tightness: 0.0,
            curve_fitting: 0.95,
            multi_stroke: true,
            stroke: Color::BLACK,
            stroke_width: 1.0,
            seed: 0,
        }
    }
}

/// A generated sketch stroke: the wobbled path plus the style to paint it
/// with. Produced once per element geometry change and cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub stroke: Color,
    pub stroke_width: f64,
    pub path: BezPath,
}

impl Drawable {
    /// A single hand-drawn line segment.
    pub fn line(start: Point, end: Point, options: &SketchOptions) -> Self {
        let mut sketcher = Sketcher::new(options);
        let mut path = BezPath::new();
        sketcher.double_line(start, end, &mut path);
        Self::styled(path, options)
    }

    /// A hand-drawn axis-aligned rectangle outline.
    pub fn rectangle(rect: Rect, options: &SketchOptions) -> Self {
        Self::polygon(
            &[
                Point::new(rect.x0, rect.y0),
                Point::new(rect.x1, rect.y0),
                Point::new(rect.x1, rect.y1),
                Point::new(rect.x0, rect.y1),
            ],
            options,
        )
    }

    /// A hand-drawn closed polygon through `corners`. Fewer than two
    /// corners produce an empty path.
    pub fn polygon(corners: &[Point], options: &SketchOptions) -> Self {
        let mut sketcher = Sketcher::new(options);
        let mut path = BezPath::new();
        if corners.len() >= 2 {
            for i in 0..corners.len() {
                let start = corners[i];
                let end = corners[(i + 1) % corners.len()];
                sketcher.double_line(start, end, &mut path);
            }
        }
        Self::styled(path, options)
    }

    /// A hand-drawn circle of the given radius.
    pub fn circle(center: Point, radius: f64, options: &SketchOptions) -> Self {
        let mut sketcher = Sketcher::new(options);
        let mut path = BezPath::new();
        sketcher.ellipse(center, radius, radius, &mut path);
        Self::styled(path, options)
    }

    fn styled(path: BezPath, options: &SketchOptions) -> Self {
        Self {
            stroke: options.stroke,
            stroke_width: options.stroke_width,
            path,
        }
    }
}

/// Generate a fresh sketch seed.
///
/// Counter plus a splitmix64-style mix, which stays unique and
/// platform-independent (no clock needed, works on WASM).
pub fn random_seed() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};

    static SEED_COUNTER: AtomicU64 = AtomicU64::new(1);

    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut x = counter.wrapping_mul(0x9E3779B97F4A7C15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^= x >> 31;
    x
}

/// Internal generator state: the seeded RNG plus the options it reads.
struct Sketcher<'a> {
    rng: StdRng,
    opts: &'a SketchOptions,
}

impl<'a> Sketcher<'a> {
    fn new(opts: &'a SketchOptions) -> Self {
        Self {
            rng: StdRng::seed_from_u64(opts.seed),
            opts,
        }
    }

    fn random(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn offset(&mut self, min: f64, max: f64, gain: f64) -> f64 {
        self.opts.roughness * gain * (self.random() * (max - min) + min)
    }

    fn offset_opt(&mut self, x: f64, gain: f64) -> f64 {
        self.offset(-x, x, gain)
    }

    /// Both passes of a hand-drawn segment.
    fn double_line(&mut self, start: Point, end: Point, path: &mut BezPath) {
        self.wobbly_line(start, end, false, path);
        if self.opts.multi_stroke {
            self.wobbly_line(start, end, true, path);
        }
    }

    /// One pass of a hand-drawn segment: a single cubic whose endpoints and
    /// control points are displaced from the ideal line. The overlay pass
    /// uses half the displacement so it hugs the first stroke.
    fn wobbly_line(&mut self, start: Point, end: Point, overlay: bool, path: &mut BezPath) {
        let delta = end - start;
        let length_sq = delta.hypot2();
        let length = length_sq.sqrt();

        // Long lines wobble proportionally less.
        let gain = if length < 200.0 {
            1.0
        } else if length > 500.0 {
            0.4
        } else {
            -0.0016668 * length + 1.233334
        };

        let mut offset = self.opts.max_randomness_offset;
        if offset * offset * 100.0 > length_sq {
            // Collapse the displacement with the segment so short segments
            // (and zero-length ones) stay put.
            offset = length / 10.0;
        }
        let half = offset / 2.0;
        let amplitude = if overlay { half } else { offset };

        let diverge = 0.2 + self.random() * 0.2;

        let mut bow_x = self.opts.bowing * self.opts.max_randomness_offset * delta.y / 200.0;
        let mut bow_y = self.opts.bowing * self.opts.max_randomness_offset * (-delta.x) / 200.0;
        bow_x += self.offset_opt(bow_x, gain);
        bow_y += self.offset_opt(bow_y, gain);

        let from = Point::new(
            start.x + self.offset_opt(amplitude, gain),
            start.y + self.offset_opt(amplitude, gain),
        );
        let cp1 = Point::new(
            bow_x + start.x + delta.x * diverge + self.offset_opt(amplitude, gain),
            bow_y + start.y + delta.y * diverge + self.offset_opt(amplitude, gain),
        );
        let cp2 = Point::new(
            bow_x + start.x + 2.0 * delta.x * diverge + self.offset_opt(amplitude, gain),
            bow_y + start.y + 2.0 * delta.y * diverge + self.offset_opt(amplitude, gain),
        );
        let to = Point::new(
            end.x + self.offset_opt(amplitude, gain),
            end.y + self.offset_opt(amplitude, gain),
        );

        path.move_to(from);
        path.curve_to(cp1, cp2, to);
    }

    /// Both passes of a hand-drawn ellipse. The second pass rides closer to
    /// the ideal radius with reduced roughness.
    fn ellipse(&mut self, center: Point, rx: f64, ry: f64, path: &mut BezPath) {
        // More samples around bigger ellipses so the curve stays smooth.
        let circumference = (PI * 2.0 * ((rx * rx + ry * ry) / 2.0).sqrt()).sqrt();
        let min_steps = self.opts.curve_step_count as f64;
        let steps = min_steps
            .max(min_steps / 200.0_f64.sqrt() * circumference)
            .ceil();
        let increment = PI * 2.0 / steps;

        let fit = 1.0 - self.opts.curve_fitting;
        let rx = rx + self.offset_opt(rx * fit, 1.0);
        let ry = ry + self.offset_opt(ry * fit, 1.0);

        let inner = self.offset(0.4, 1.0, 1.0);
        let overlap = increment * self.offset(0.1, inner, 1.0);
        let ring = self.ellipse_ring(increment, center, rx, ry, 1.0, overlap, 1.0);
        self.curve_through(&ring, path);

        if self.opts.multi_stroke {
            let ring = self.ellipse_ring(increment, center, rx, ry, 1.5, 0.0, 0.8);
            self.curve_through(&ring, path);
        }
    }

    /// Sample a displaced point ring around the ellipse. The ring starts a
    /// little before angle zero and the last samples fold back over the
    /// start so the fitted curve reads as one closed stroke; `level` scales
    /// every displacement for the lighter second pass.
    fn ellipse_ring(
        &mut self,
        increment: f64,
        center: Point,
        rx: f64,
        ry: f64,
        displacement: f64,
        overlap: f64,
        level: f64,
    ) -> Vec<Point> {
        let rad_offset = self.offset_opt(0.5 * level, 1.0) - PI / 2.0;

        let mut points = Vec::new();
        points.push(Point::new(
            self.offset_opt(displacement * level, 1.0)
                + center.x
                + 0.9 * rx * (rad_offset - increment).cos(),
            self.offset_opt(displacement * level, 1.0)
                + center.y
                + 0.9 * ry * (rad_offset - increment).sin(),
        ));

        let end_angle = PI * 2.0 + rad_offset - 0.01;
        let mut angle = rad_offset;
        while angle < end_angle {
            points.push(Point::new(
                self.offset_opt(displacement * level, 1.0) + center.x + rx * angle.cos(),
                self.offset_opt(displacement * level, 1.0) + center.y + ry * angle.sin(),
            ));
            angle += increment;
        }

        points.push(Point::new(
            self.offset_opt(displacement * level, 1.0)
                + center.x
                + rx * (rad_offset + PI * 2.0 + overlap * 0.5).cos(),
            self.offset_opt(displacement * level, 1.0)
                + center.y
                + ry * (rad_offset + PI * 2.0 + overlap * 0.5).sin(),
        ));
        points.push(Point::new(
            self.offset_opt(displacement * level, 1.0)
                + center.x
                + 0.98 * rx * (rad_offset + overlap).cos(),
            self.offset_opt(displacement * level, 1.0)
                + center.y
                + 0.98 * ry * (rad_offset + overlap).sin(),
        ));
        points.push(Point::new(
            self.offset_opt(displacement * level, 1.0)
                + center.x
                + 0.9 * rx * (rad_offset + overlap * 0.5).cos(),
            self.offset_opt(displacement * level, 1.0)
                + center.y
                + 0.9 * ry * (rad_offset + overlap * 0.5).sin(),
        ));

        points
    }

    /// Fit Catmull-Rom-style cubics through a point run. Endpoints are
    /// duplicated so the curve reaches them.
    fn curve_through(&self, points: &[Point], path: &mut BezPath) {
        match points {
            [] | [_] => {}
            [a, b] => {
                path.move_to(*a);
                path.line_to(*b);
            }
            _ => {
                let mut ext = Vec::with_capacity(points.len() + 2);
                ext.push(points[0]);
                ext.extend_from_slice(points);
                ext.push(points[points.len() - 1]);

                let s = 1.0 - self.opts.curve_tightness;
                path.move_to(ext[1]);
                for i in 1..ext.len() - 2 {
                    let p0 = ext[i - 1];
                    let p1 = ext[i];
                    let p2 = ext[i + 1];
                    let p3 = ext[i + 2];
                    let cp1 = Point::new(
                        p1.x + (s * p2.x - s * p0.x) / 6.0,
                        p1.y + (s * p2.y - s * p0.y) / 6.0,
                    );
                    let cp2 = Point::new(
                        p2.x + (s * p1.x - s * p3.x) / 6.0,
                        p2.y + (s * p1.y - s * p3.y) / 6.0,
                    );
                    path.curve_to(cp1, cp2, p2);
                }
            }
        }
    }
}
