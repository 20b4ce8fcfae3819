//! Scan conversion of editor primitives into ordered pixel sequences.
//!
//! Every function here is pure: the same control points always produce the
//! same pixels, and nothing is cached. Rendering calls back into this module
//! on every paint.

use crate::draw::error::{EditorError, EditorResult};
use crate::draw::geometry::{sign, span, Point, PointF};
use crate::draw::model::{Algorithm, PrimitiveKind};
use crate::draw::settings::GeometrySettings;

/// Rasterize with the default geometry settings.
pub fn rasterize(
    kind: PrimitiveKind,
    points: &[Point],
    algorithm: Algorithm,
) -> EditorResult<Vec<Point>> {
    Rasterizer::default().rasterize(kind, points, algorithm)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Rasterizer {
    settings: GeometrySettings,
}

impl Rasterizer {
    pub fn new(mut settings: GeometrySettings) -> Self {
        settings.sanitize();
        Self { settings }
    }

    pub fn settings(&self) -> &GeometrySettings {
        &self.settings
    }

    pub fn rasterize(
        &self,
        kind: PrimitiveKind,
        points: &[Point],
        algorithm: Algorithm,
    ) -> EditorResult<Vec<Point>> {
        if !kind.accepts(algorithm) {
            return Err(EditorError::invalid(format!(
                "algorithm '{algorithm}' cannot draw a {kind}"
            )));
        }
        let pixels = match kind {
            PrimitiveKind::Line => draw_line(points, algorithm),
            PrimitiveKind::Polygon => draw_polygon(points, algorithm),
            PrimitiveKind::Rect => draw_rect(points),
            PrimitiveKind::Ellipse => draw_ellipse(points, self.settings.tie_break_bias),
            PrimitiveKind::Curve if algorithm == Algorithm::Bezier => {
                draw_bezier(points, self.settings.curve_samples())
            }
            PrimitiveKind::Curve => draw_bspline(points, self.settings.curve_samples()),
            PrimitiveKind::Freeform => points.to_vec(),
        };
        Ok(pixels)
    }
}

// ============================================================================
// Lines and polygons
// ============================================================================

/// `algorithm` must be one of the line algorithms; anything else is treated as
/// Bresenham.
fn draw_line(points: &[Point], algorithm: Algorithm) -> Vec<Point> {
    let [a, b] = match points {
        [a, b, ..] => [*a, *b],
        _ => return points.to_vec(),
    };
    if a == b {
        return vec![a];
    }
    if a.x == b.x {
        return span(a.y, b.y).map(|y| Point::new(a.x, y)).collect();
    }

    let k = a.slope(b);
    match algorithm {
        Algorithm::Naive => span(a.x, b.x)
            .map(|x| Point::from_f64(x as f64, k * (x - a.x) as f64 + a.y as f64))
            .collect(),
        Algorithm::Dda => line_dda(a, b, k),
        _ => line_bresenham(a, b, k),
    }
}

fn line_dda(a: Point, b: Point, k: f64) -> Vec<Point> {
    if k.abs() > 1.0 {
        let x_step = sign(b.y - a.y) as f64 / k;
        let mut x = a.x as f64;
        span(a.y, b.y)
            .map(|y| {
                let p = Point::from_f64(x, y as f64);
                x += x_step;
                p
            })
            .collect()
    } else {
        let y_step = sign(b.x - a.x) as f64 * k;
        let mut y = a.y as f64;
        span(a.x, b.x)
            .map(|x| {
                let p = Point::from_f64(x as f64, y);
                y += y_step;
                p
            })
            .collect()
    }
}

fn line_bresenham(a: Point, b: Point, k: f64) -> Vec<Point> {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    let (sign_x, sign_y) = (sign(b.x - a.x), sign(b.y - a.y));

    if k.abs() > 1.0 {
        let mut p = 2 * dx - dy;
        let mut x = a.x;
        span(a.y, b.y)
            .map(|y| {
                let out = Point::new(x, y);
                if p > 0 {
                    x += sign_x;
                    p -= 2 * dy;
                }
                p += 2 * dx;
                out
            })
            .collect()
    } else {
        let mut p = 2 * dy - dx;
        let mut y = a.y;
        span(a.x, b.x)
            .map(|x| {
                let out = Point::new(x, y);
                if p > 0 {
                    y += sign_y;
                    p -= 2 * dx;
                }
                p += 2 * dy;
                out
            })
            .collect()
    }
}

fn draw_polygon(points: &[Point], algorithm: Algorithm) -> Vec<Point> {
    if points.len() == 2 {
        return draw_line(points, algorithm);
    }
    let mut out = Vec::new();
    for (i, &p) in points.iter().enumerate() {
        let prev = points[(i + points.len() - 1) % points.len()];
        out.extend(draw_line(&[prev, p], algorithm));
    }
    out
}

// ============================================================================
// Rectangles and ellipses
// ============================================================================

fn draw_rect(points: &[Point]) -> Vec<Point> {
    let [p0, p1] = match points {
        [a, b, ..] => [*a, *b],
        _ => return Vec::new(),
    };
    if p0.x == p1.x || p0.y == p1.y {
        return Vec::new();
    }
    let mut out = Vec::new();
    for x in span(p0.x, p1.x) {
        out.push(Point::new(x, p0.y));
        out.push(Point::new(x, p1.y));
    }
    for y in span(p0.y, p1.y) {
        out.push(Point::new(p0.x, y));
        out.push(Point::new(p1.x, y));
    }
    out
}

/// Midpoint ellipse inscribed in the box spanned by the first two points.
fn draw_ellipse(points: &[Point], bias: f64) -> Vec<Point> {
    let [a, b] = match points {
        [a, b, ..] => [*a, *b],
        _ => return Vec::new(),
    };
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));

    let rx = (x1 - x0) as f64 / 2.0;
    let ry = (y1 - y0) as f64 / 2.0;
    let (rx2, ry2) = (rx * rx, ry * ry);
    let xc = (x1 + x0) as f64 / 2.0;
    let yc = (y1 + y0) as f64 / 2.0;

    let mut x = 0.0_f64;
    let mut y = ry;
    let mut quadrant = vec![Point::from_f64(x, y)];

    // Region 1: |slope| < 1, x advances every step.
    let mut p = ry2 - rx2 * ry + rx2 / 4.0;
    while ry2 * x < rx2 * y {
        if p >= 0.0 {
            y -= 1.0;
            p += 2.0 * rx2 * (1.0 - y);
        }
        p += ry2 * (3.0 + 2.0 * x);
        x += 1.0;
        quadrant.push(Point::from_f64(x, y));
    }

    // Region 2: y descends every step.
    p = ry2 * (x + 0.5) * (x + 0.5) + rx2 * (y - 1.0) * (y - 1.0) - rx2 * ry2;
    while y > 0.0 {
        if p <= 0.0 {
            x += 1.0;
            p += 2.0 * ry2 * (1.0 + x);
        }
        y -= 1.0;
        p += rx2 * (3.0 - 2.0 * y);
        quadrant.push(Point::from_f64(x, y));
    }

    let mut out = Vec::with_capacity(quadrant.len() * 4);
    for q in &quadrant {
        for nx in [-1.0, 1.0] {
            for ny in [-1.0, 1.0] {
                out.push(Point::from_f64(
                    nx * q.x as f64 + xc - bias,
                    ny * q.y as f64 + yc - bias,
                ));
            }
        }
    }
    out
}

// ============================================================================
// Curves
// ============================================================================

fn sample_params(samples: usize) -> impl Iterator<Item = f64> {
    (0..=samples).map(move |i| i as f64 / samples as f64)
}

/// De Casteljau evaluation at `samples + 1` evenly spaced parameters.
fn draw_bezier(points: &[Point], samples: usize) -> Vec<Point> {
    if points.is_empty() {
        return Vec::new();
    }
    let control: Vec<PointF> = points.iter().map(|p| p.to_f()).collect();
    let n = control.len();
    let mut work = control.clone();

    sample_params(samples)
        .map(|u| {
            work.copy_from_slice(&control);
            for level in 1..n {
                for j in 0..n - level {
                    work[j] = work[j].lerp(work[j + 1], u);
                }
            }
            work[0].round()
        })
        .collect()
}

fn bspline_basis(u: f64) -> [f64; 4] {
    let u2 = u * u;
    let u3 = u2 * u;
    [
        (-u3 + 3.0 * u2 - 3.0 * u + 1.0) / 6.0,
        (3.0 * u3 - 6.0 * u2 + 4.0) / 6.0,
        (-3.0 * u3 + 3.0 * u2 + 3.0 * u + 1.0) / 6.0,
        u3 / 6.0,
    ]
}

/// Uniform cubic B-spline; one point per window of four control points per
/// parameter value. Does not pass through the first and last control points.
fn draw_bspline(points: &[Point], samples: usize) -> Vec<Point> {
    if points.len() < 4 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity((samples + 1) * (points.len() - 3));
    for u in sample_params(samples) {
        let basis = bspline_basis(u);
        for window in points.windows(4) {
            let (x, y) = window
                .iter()
                .zip(basis)
                .fold((0.0, 0.0), |(x, y), (p, w)| {
                    (x + p.x as f64 * w, y + p.y as f64 * w)
                });
            out.push(Point::from_f64(x, y));
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
