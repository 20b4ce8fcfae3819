use crate::draw::error::{EditorError, EditorResult};
use crate::draw::geometry::{bounds, Point};
use crate::draw::settings::GeometrySettings;
use crate::draw::transform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of ids handed out by the editor's counter.
    pub fn sequence(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Line,
    Polygon,
    Rect,
    Ellipse,
    Curve,
    #[serde(alias = "freenom")]
    Freeform,
}

impl PrimitiveKind {
    /// Kinds whose placement takes an open-ended number of clicks.
    pub fn is_multi_click(self) -> bool {
        matches!(self, Self::Polygon | Self::Curve | Self::Freeform)
    }

    pub fn accepts(self, algorithm: Algorithm) -> bool {
        match self {
            Self::Line | Self::Polygon => algorithm.is_line_algorithm(),
            Self::Curve => matches!(algorithm, Algorithm::Bezier | Algorithm::BSpline),
            Self::Rect | Self::Ellipse | Self::Freeform => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Rect => "rect",
            Self::Ellipse => "ellipse",
            Self::Curve => "curve",
            Self::Freeform => "freeform",
        }
    }
}

impl FromStr for PrimitiveKind {
    type Err = EditorError;

    fn from_str(s: &str) -> EditorResult<Self> {
        match s {
            "line" => Ok(Self::Line),
            "polygon" => Ok(Self::Polygon),
            "rect" => Ok(Self::Rect),
            "ellipse" => Ok(Self::Ellipse),
            "curve" => Ok(Self::Curve),
            "freeform" | "freenom" => Ok(Self::Freeform),
            other => Err(EditorError::invalid(format!("unknown primitive kind '{other}'"))),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Rasterization or clipping algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "none")]
    None,
    Naive,
    #[serde(rename = "DDA")]
    Dda,
    Bresenham,
    Bezier,
    #[serde(rename = "B-spline")]
    BSpline,
    #[serde(rename = "Cohen-Sutherland")]
    CohenSutherland,
    #[serde(rename = "Liang-Barsky")]
    LiangBarsky,
}

impl Algorithm {
    pub fn is_line_algorithm(self) -> bool {
        matches!(self, Self::Naive | Self::Dda | Self::Bresenham)
    }

    pub fn is_clip_algorithm(self) -> bool {
        matches!(self, Self::CohenSutherland | Self::LiangBarsky)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Naive => "Naive",
            Self::Dda => "DDA",
            Self::Bresenham => "Bresenham",
            Self::Bezier => "Bezier",
            Self::BSpline => "B-spline",
            Self::CohenSutherland => "Cohen-Sutherland",
            Self::LiangBarsky => "Liang-Barsky",
        }
    }
}

impl FromStr for Algorithm {
    type Err = EditorError;

    fn from_str(s: &str) -> EditorResult<Self> {
        match s {
            "" | "none" => Ok(Self::None),
            "Naive" => Ok(Self::Naive),
            "DDA" => Ok(Self::Dda),
            "Bresenham" => Ok(Self::Bresenham),
            "Bezier" => Ok(Self::Bezier),
            "B-spline" => Ok(Self::BSpline),
            "Cohen-Sutherland" => Ok(Self::CohenSutherland),
            "Liang-Barsky" => Ok(Self::LiangBarsky),
            other => Err(EditorError::invalid(format!("unknown algorithm '{other}'"))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Translate,
    Rotate,
    Scale,
    Clip,
}

impl TransformKind {
    pub fn accepts(self, algorithm: Algorithm) -> bool {
        match self {
            Self::Clip => algorithm.is_clip_algorithm(),
            Self::Translate | Self::Rotate | Self::Scale => true,
        }
    }
}

impl FromStr for TransformKind {
    type Err = EditorError;

    fn from_str(s: &str) -> EditorResult<Self> {
        match s {
            "translate" => Ok(Self::Translate),
            "rotate" => Ok(Self::Rotate),
            "scale" => Ok(Self::Scale),
            "clip" => Ok(Self::Clip),
            other => Err(EditorError::invalid(format!("unknown transform '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A transform staged on an entity: the renderer applies it on the fly until
/// it is committed into the control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTransform {
    pub kind: TransformKind,
    pub handles: Vec<Point>,
    #[serde(default)]
    pub algorithm: Algorithm,
}

impl PendingTransform {
    pub fn apply(
        &self,
        origin: &[Point],
        undo: bool,
        settings: &GeometrySettings,
    ) -> EditorResult<Vec<Point>> {
        transform::p_transform(
            self.kind,
            origin,
            &self.handles,
            self.algorithm,
            undo,
            settings.scale_reference,
        )
    }
}

/// Immutable description of a primitive, as stored in the command log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDesc {
    pub kind: PrimitiveKind,
    pub points: Vec<Point>,
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: PrimitiveKind,
    pub control_points: Vec<Point>,
    pub algorithm: Algorithm,
    pub color: Color,
    pub selected: bool,
    pub pending: Option<PendingTransform>,
}

impl Entity {
    pub fn from_desc(id: EntityId, desc: &EntityDesc) -> Self {
        Self {
            id,
            kind: desc.kind,
            control_points: desc.points.clone(),
            algorithm: desc.algorithm,
            color: desc.color,
            selected: false,
            pending: None,
        }
    }

    pub fn desc(&self) -> EntityDesc {
        EntityDesc {
            kind: self.kind,
            points: self.control_points.clone(),
            algorithm: self.algorithm,
            color: self.color,
        }
    }

    /// Control points with any staged transform applied.
    pub fn display_points(&self, settings: &GeometrySettings) -> Vec<Point> {
        let Some(pending) = &self.pending else {
            return self.control_points.clone();
        };
        match pending.apply(&self.control_points, false, settings) {
            Ok(points) => points,
            Err(err) => {
                tracing::warn!(id = %self.id, %err, "pending transform could not be previewed");
                self.control_points.clone()
            }
        }
    }

    /// Selection highlight box, one pixel outside the displayed geometry.
    pub fn bounding_box(&self, settings: &GeometrySettings) -> Option<BoundingBox> {
        let (lo, hi) = bounds(&self.display_points(settings))?;
        Some(BoundingBox {
            x: lo.x - 1,
            y: lo.y - 1,
            width: hi.x - lo.x + 2,
            height: hi.y - lo.y + 2,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Opposite corners, usable as rect control points.
    pub fn corners(self) -> [Point; 2] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y + self.height),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(i32, i32)]) -> Entity {
        Entity::from_desc(
            EntityId::new("1"),
            &EntityDesc {
                kind: PrimitiveKind::Line,
                points: points.iter().copied().map(Point::from).collect(),
                algorithm: Algorithm::Bresenham,
                color: Color::BLACK,
            },
        )
    }

    #[test]
    fn parses_kinds_and_algorithms() {
        assert_eq!("freenom".parse::<PrimitiveKind>(), Ok(PrimitiveKind::Freeform));
        assert_eq!("B-spline".parse::<Algorithm>(), Ok(Algorithm::BSpline));
        assert_eq!("".parse::<Algorithm>(), Ok(Algorithm::None));
        assert!(matches!(
            "spline".parse::<Algorithm>(),
            Err(EditorError::InvalidArgument(_))
        ));
        assert!(matches!(
            "circle".parse::<PrimitiveKind>(),
            Err(EditorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn algorithm_serializes_with_display_names() {
        let json = serde_json::to_string(&Algorithm::CohenSutherland).expect("serialize");
        assert_eq!(json, "\"Cohen-Sutherland\"");
        let decoded: Algorithm = serde_json::from_str("\"DDA\"").expect("deserialize");
        assert_eq!(decoded, Algorithm::Dda);
    }

    #[test]
    fn kinds_accept_matching_algorithms_only() {
        assert!(PrimitiveKind::Line.accepts(Algorithm::Dda));
        assert!(!PrimitiveKind::Line.accepts(Algorithm::Bezier));
        assert!(PrimitiveKind::Curve.accepts(Algorithm::BSpline));
        assert!(PrimitiveKind::Ellipse.accepts(Algorithm::None));
        assert!(TransformKind::Clip.accepts(Algorithm::LiangBarsky));
        assert!(!TransformKind::Clip.accepts(Algorithm::None));
    }

    #[test]
    fn display_points_apply_pending_without_mutating() {
        let mut entity = line(&[(0, 0), (10, 0)]);
        entity.pending = Some(PendingTransform {
            kind: TransformKind::Translate,
            handles: vec![Point::new(0, 0), Point::new(3, 4)],
            algorithm: Algorithm::None,
        });
        let shown = entity.display_points(&GeometrySettings::default());
        assert_eq!(shown, vec![Point::new(3, 4), Point::new(13, 4)]);
        assert_eq!(entity.control_points, vec![Point::new(0, 0), Point::new(10, 0)]);
    }

    #[test]
    fn bounding_box_pads_by_one_pixel() {
        let entity = line(&[(2, 5), (8, 1)]);
        let bbox = entity
            .bounding_box(&GeometrySettings::default())
            .expect("non-empty entity");
        assert_eq!(
            bbox,
            BoundingBox {
                x: 1,
                y: 0,
                width: 8,
                height: 6
            }
        );
    }
}
