use serde::{Deserialize, Serialize};

/// Integer pixel-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds both coordinates to the nearest integer, ties to even.
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self {
            x: round_coord(x),
            y: round_coord(y),
        }
    }

    /// `dy / dx` between the two points. Infinite for vertical pairs.
    pub fn slope(self, other: Point) -> f64 {
        (f64::from(self.y) - f64::from(other.y)) / (f64::from(self.x) - f64::from(other.x))
    }

    /// `dx / dy` between the two points. Infinite for horizontal pairs.
    pub fn slope_y(self, other: Point) -> f64 {
        (f64::from(self.x) - f64::from(other.x)) / (f64::from(self.y) - f64::from(other.y))
    }

    pub fn to_f(self) -> PointF {
        PointF::new(self.x as f64, self.y as f64)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Real-valued point used while evaluating curves, before the final rounding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation `(1 - u) * self + u * other`.
    #[inline]
    pub fn lerp(self, other: PointF, u: f64) -> PointF {
        PointF::new(
            (1.0 - u) * self.x + u * other.x,
            (1.0 - u) * self.y + u * other.y,
        )
    }

    pub fn round(self) -> Point {
        Point::from_f64(self.x, self.y)
    }
}

#[inline]
pub fn round_coord(v: f64) -> i32 {
    v.round_ties_even() as i32
}

#[inline]
pub fn sign(v: i32) -> i32 {
    v.signum()
}

/// Inclusive integer walk from `from` to `to` in whichever direction they lie.
pub fn span(from: i32, to: i32) -> impl Iterator<Item = i32> {
    let (from, to) = (i64::from(from), i64::from(to));
    let step = if to >= from { 1 } else { -1 };
    // Every value lies between `from` and `to`, so narrowing back is lossless.
    (0..=(to - from).abs()).map(move |i| (from + i * step) as i32)
}

/// Smallest axis-aligned box holding every point, `None` for an empty slice.
pub fn bounds(points: &[Point]) -> Option<(Point, Point)> {
    let first = *points.first()?;
    Some(points.iter().skip(1).fold((first, first), |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}
