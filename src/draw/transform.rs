//! Affine transforms and segment clipping over control-point lists.

use std::f64::consts::TAU;

use crate::draw::error::{EditorError, EditorResult};
use crate::draw::geometry::{Point, PointF};
use crate::draw::model::{Algorithm, TransformKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Angle {
    Degrees(f64),
    Radians(f64),
}

impl Angle {
    pub fn radians(self) -> f64 {
        match self {
            Angle::Degrees(d) => d.to_radians(),
            Angle::Radians(r) => r,
        }
    }
}

/// Offsets every point. Coordinates wrap at the `i32` limits, so translating
/// back by the negated offset always restores the input.
pub fn translate(points: &[Point], dx: i32, dy: i32) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::new(p.x.wrapping_add(dx), p.y.wrapping_add(dy)))
        .collect()
}

/// Rotates about `(cx, cy)`. Positive angles turn clockwise on a y-down canvas.
pub fn rotate(points: &[Point], cx: i32, cy: i32, angle: Angle) -> Vec<Point> {
    let (sin, cos) = angle.radians().sin_cos();
    let (cx, cy) = (cx as f64, cy as f64);
    points
        .iter()
        .map(|p| {
            let (x, y) = (p.x as f64 - cx, p.y as f64 - cy);
            Point::from_f64(x * cos - y * sin + cx, x * sin + y * cos + cy)
        })
        .collect()
}

/// Scales about `(cx, cy)`. A missing or zero `sy` reuses `sx`.
pub fn scale(points: &[Point], cx: i32, cy: i32, sx: f64, sy: Option<f64>) -> Vec<Point> {
    let sy = match sy {
        Some(s) if s != 0.0 => s,
        _ => sx,
    };
    let (cx, cy) = (cx as f64, cy as f64);
    points
        .iter()
        .map(|p| Point::from_f64((p.x as f64 - cx) * sx + cx, (p.y as f64 - cy) * sy + cy))
        .collect()
}

// ============================================================================
// Clipping
// ============================================================================

/// Axis-aligned clip window, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl ClipRect {
    pub const fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y).normalized()
    }

    /// Swaps min/max where the window was given corner-reversed.
    pub fn normalized(self) -> Self {
        Self {
            x_min: self.x_min.min(self.x_max),
            y_min: self.y_min.min(self.y_max),
            x_max: self.x_min.max(self.x_max),
            y_max: self.y_min.max(self.y_max),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.outcode(p.to_f()) == 0
    }

    fn outcode(&self, p: PointF) -> u8 {
        let mut code = 0;
        if p.x < f64::from(self.x_min) {
            code |= LEFT;
        } else if p.x > f64::from(self.x_max) {
            code |= RIGHT;
        }
        if p.y < f64::from(self.y_min) {
            code |= BOTTOM;
        } else if p.y > f64::from(self.y_max) {
            code |= TOP;
        }
        code
    }
}

// Outcode bits. BOTTOM is the `y < y_min` side.
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

/// Each pass snaps one endpoint onto a boundary; two boundaries per endpoint
/// is the most a convergent run needs.
const MAX_CLIP_PASSES: usize = 8;

/// Clips a two-point segment against `window`.
///
/// Returns an empty list when the segment lies outside, otherwise the visible
/// part with the same start/end orientation as the input.
pub fn clip(points: &[Point], window: ClipRect, algorithm: Algorithm) -> EditorResult<Vec<Point>> {
    let &[a, b] = points else {
        return Err(EditorError::invalid(format!(
            "clipping needs exactly 2 points, got {}",
            points.len()
        )));
    };
    let window = window.normalized();
    let visible = match algorithm {
        Algorithm::CohenSutherland => clip_cohen_sutherland(a, b, &window),
        Algorithm::LiangBarsky => clip_liang_barsky(a, b, &window),
        other => {
            return Err(EditorError::invalid(format!(
                "'{other}' is not a clipping algorithm"
            )))
        }
    };
    Ok(visible.map(|(a, b)| vec![a, b]).unwrap_or_default())
}

/// Endpoints move in real coordinates; only the accepted pair is rounded.
fn clip_cohen_sutherland(a: Point, b: Point, window: &ClipRect) -> Option<(Point, Point)> {
    let (mut a, mut b) = (a.to_f(), b.to_f());
    let mut swapped = false;
    for _ in 0..MAX_CLIP_PASSES {
        let (code_a, code_b) = (window.outcode(a), window.outcode(b));
        if code_a & code_b != 0 {
            return None;
        }
        if code_a | code_b == 0 {
            let (a, b) = (a.round(), b.round());
            return Some(if swapped { (b, a) } else { (a, b) });
        }
        // Always move `a`, the endpoint that is outside.
        if code_a == 0 {
            std::mem::swap(&mut a, &mut b);
            swapped = !swapped;
        }
        // `b` lies on the other side of the chosen edge, so neither
        // denominator below is zero.
        let code = window.outcode(a);
        a = if code & (LEFT | RIGHT) != 0 {
            let x = f64::from(if code & LEFT != 0 {
                window.x_min
            } else {
                window.x_max
            });
            PointF::new(x, a.y + (b.y - a.y) * (x - a.x) / (b.x - a.x))
        } else {
            let y = f64::from(if code & TOP != 0 {
                window.y_max
            } else {
                window.y_min
            });
            PointF::new(a.x + (b.x - a.x) * (y - a.y) / (b.y - a.y), y)
        };
    }
    tracing::debug!(?a, ?b, ?window, "cohen-sutherland did not converge, rejecting");
    None
}

fn clip_liang_barsky(a: Point, b: Point, window: &ClipRect) -> Option<(Point, Point)> {
    let (a, b) = (a.to_f(), b.to_f());
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let p = [-dx, dx, -dy, dy];
    let q = [
        a.x - f64::from(window.x_min),
        f64::from(window.x_max) - a.x,
        a.y - f64::from(window.y_min),
        f64::from(window.y_max) - a.y,
    ];

    let mut rn1 = 0.0_f64;
    let mut rn2 = 1.0_f64;
    for (p, q) in p.into_iter().zip(q) {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            rn1 = rn1.max(q / p);
        } else {
            rn2 = rn2.min(q / p);
        }
    }
    if rn1 > rn2 {
        return None;
    }
    let at = |t: f64| Point::from_f64(a.x + dx * t, a.y + dy * t);
    Some((at(rn1), at(rn2)))
}

// ============================================================================
// Handle-driven transforms
// ============================================================================

/// Applies a transform described by two handle points, as placed with the
/// pointer. `undo` computes the inverse so that a committed edit can be rolled
/// back from the entity's current points.
///
/// * translate: offset `handles[1] - handles[0]`
/// * rotate: about `handles[0]` by the direction angle towards `handles[1]`
/// * scale: about `handles[0]`, `|d| / scale_reference` per axis, 1 where `d == 0`
/// * clip: `handles` span the window. The inverse returns `origin` unchanged;
///   the history keeps the pre-clip geometry itself.
pub fn p_transform(
    kind: TransformKind,
    origin: &[Point],
    handles: &[Point],
    algorithm: Algorithm,
    undo: bool,
    scale_reference: f64,
) -> EditorResult<Vec<Point>> {
    let (h0, h1) = match handles {
        [h0, h1, ..] => (*h0, *h1),
        _ => {
            return Err(EditorError::invalid(format!(
                "{kind:?} needs 2 handle points, got {}",
                handles.len()
            )))
        }
    };

    let points = match kind {
        TransformKind::Translate => {
            let (dx, dy) = (h1.x.wrapping_sub(h0.x), h1.y.wrapping_sub(h0.y));
            if undo {
                translate(origin, dx.wrapping_neg(), dy.wrapping_neg())
            } else {
                translate(origin, dx, dy)
            }
        }
        TransformKind::Rotate => {
            if h0 == h1 {
                return Ok(origin.to_vec());
            }
            let (d, h) = (h1.to_f(), h0.to_f());
            let theta = (d.y - h.y)
                .atan2(d.x - h.x)
                .rem_euclid(TAU);
            let theta = if undo { TAU - theta } else { theta };
            rotate(origin, h0.x, h0.y, Angle::Radians(theta))
        }
        TransformKind::Scale => {
            let factor = |from: i32, to: i32| {
                if from == to {
                    1.0
                } else {
                    (f64::from(to) - f64::from(from)).abs() / scale_reference
                }
            };
            let (mut sx, mut sy) = (factor(h0.x, h1.x), factor(h0.y, h1.y));
            if undo {
                sx = sx.recip();
                sy = sy.recip();
            }
            scale(origin, h0.x, h0.y, sx, Some(sy))
        }
        TransformKind::Clip => {
            if undo {
                return Ok(origin.to_vec());
            }
            clip(origin, ClipRect::from_corners(h0, h1), algorithm)?
        }
    };
    Ok(points)
}
