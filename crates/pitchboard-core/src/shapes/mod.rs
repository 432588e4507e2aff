//! Annotation shapes placed on top of the pitch.

mod arrow;
mod ball;
mod cone;
pub mod factory;
mod freehand;
mod marker;
mod player;
mod text;

pub use arrow::{Arrowhead, ArrowOrLine, LineStyle, wavy_points};
pub use ball::{BALL_STROKE_WIDTH, Ball};
pub use cone::{CONE_STROKE_WIDTH, Cone};
pub use freehand::{FreehandStroke, PathCommand};
pub use marker::{MARKER_STROKE_WIDTH, Marker, MarkerPart};
pub use player::{PLAYER_STROKE_WIDTH, PlayerPart, PlayerToken, Team};
pub use text::{TextLabel, glyph_cells, text_block_size};

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for shapes and background marks.
pub type ShapeId = Uuid;

/// Error returned when a colour string cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid colour {0:?}")]
pub struct ColorParseError(pub String);

/// RGBA8 colour, serialized as a `#rrggbb` (or `#rrggbbaa`) hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse(color: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(color.to_string());
        let hex = color.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        match hex.len() {
            3 => Ok(Self::rgb(
                byte(&hex[0..1])? * 17,
                byte(&hex[1..2])? * 17,
                byte(&hex[2..3])? * 17,
            )),
            6 => Ok(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Ok(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => Err(err()),
        }
    }

    /// Parse a colour known at compile time to be valid.
    pub(crate) fn hex(color: &str) -> Self {
        Self::parse(color).unwrap_or(Self::black())
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_string()
    }
}

fn one() -> f64 {
    1.0
}

/// Placement of an annotation on the canvas.
///
/// Token shapes are drawn in local coordinates centred on `(left, top)`,
/// scaled then rotated by `angle` degrees. Point-bearing shapes (lines,
/// arrows, strokes) keep absolute canvas coordinates; for them `left`/`top`
/// is a translation offset and the scale factors are carried through
/// rescaling without affecting how they are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    #[serde(default)]
    pub angle: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Point::ZERO)
    }
}

impl Transform {
    /// Unscaled, unrotated transform at a position.
    pub fn at(position: Point) -> Self {
        Self {
            left: position.x,
            top: position.y,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Average of the absolute scale factors, used for strokes and arrowheads.
    pub fn mean_scale(&self) -> f64 {
        (self.scale_x.abs() + self.scale_y.abs()) / 2.0
    }
}

/// Discriminator for the annotation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Player,
    Ball,
    Cone,
    Marker,
    Arrow,
    Freehand,
    Text,
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    if let [only] = points {
        return only.distance(point);
    }
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Point-in-polygon test (even-odd rule).
pub(crate) fn polygon_contains(polygon: &[Point], point: Point) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Bounding box of a set of points.
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
}

/// Common trait for all annotation kinds.
pub trait ShapeTrait {
    fn kind(&self) -> ShapeKind;

    /// Bounding box in the shape's own coordinates.
    fn local_bounds(&self) -> Rect;

    /// Check if a point in the shape's own coordinates hits it.
    fn hit_test_local(&self, point: Point, tolerance: f64) -> bool;

    /// Scale any embedded point coordinates independently per axis.
    fn scale_points(&mut self, _sx: f64, _sy: f64) {}

    /// Whether geometry is stored as absolute canvas coordinates.
    fn has_absolute_points(&self) -> bool {
        false
    }
}

/// Enum wrapper for all annotation kinds (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Player(PlayerToken),
    Ball(Ball),
    Cone(Cone),
    Marker(Marker),
    Arrow(ArrowOrLine),
    Freehand(FreehandStroke),
    Text(TextLabel),
}

impl Shape {
    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Player(s) => s,
            Shape::Ball(s) => s,
            Shape::Cone(s) => s,
            Shape::Marker(s) => s,
            Shape::Arrow(s) => s,
            Shape::Freehand(s) => s,
            Shape::Text(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Player(s) => s,
            Shape::Ball(s) => s,
            Shape::Cone(s) => s,
            Shape::Marker(s) => s,
            Shape::Arrow(s) => s,
            Shape::Freehand(s) => s,
            Shape::Text(s) => s,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.as_trait().kind()
    }

    pub fn local_bounds(&self) -> Rect {
        self.as_trait().local_bounds()
    }

    pub fn hit_test_local(&self, point: Point, tolerance: f64) -> bool {
        self.as_trait().hit_test_local(point, tolerance)
    }

    pub fn scale_points(&mut self, sx: f64, sy: f64) {
        self.as_trait_mut().scale_points(sx, sy);
    }

    pub fn has_absolute_points(&self) -> bool {
        self.as_trait().has_absolute_points()
    }

    /// Apply a fill to the body part of the shape.
    ///
    /// Players and markers recolour their body, cones their triangle. Other
    /// kinds have no body and are left unchanged; returns whether anything changed.
    pub fn set_body_color(&mut self, color: SerializableColor) -> bool {
        match self {
            Shape::Player(p) => {
                p.fill = color;
                true
            }
            Shape::Marker(m) => {
                m.fill = color;
                true
            }
            Shape::Cone(c) => {
                c.fill = color;
                true
            }
            _ => false,
        }
    }

    pub fn as_arrow(&self) -> Option<&ArrowOrLine> {
        match self {
            Shape::Arrow(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_arrow_mut(&mut self) -> Option<&mut ArrowOrLine> {
        match self {
            Shape::Arrow(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextLabel> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}

fn interactive_default() -> bool {
    true
}

/// A foreground drawable: placement plus kind-specific geometry and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: ShapeId,
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(flatten)]
    pub shape: Shape,
    /// Cleared while the shape is provisional so it ignores pointer input.
    #[serde(skip, default = "interactive_default")]
    pub(crate) interactive: bool,
}

impl Annotation {
    pub fn new(shape: Shape, transform: Transform) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform,
            shape,
            interactive: true,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Local-to-canvas transform.
    pub fn affine(&self) -> Affine {
        let t = &self.transform;
        let translate = Affine::translate((t.left, t.top));
        if self.shape.has_absolute_points() {
            translate
        } else {
            translate
                * Affine::rotate(t.angle.to_radians())
                * Affine::scale_non_uniform(t.scale_x, t.scale_y)
        }
    }

    /// Axis-aligned bounding box on the canvas.
    pub fn bounds(&self) -> Rect {
        let local = self.shape.local_bounds();
        let affine = self.affine();
        let corners = [
            Point::new(local.x0, local.y0),
            Point::new(local.x1, local.y0),
            Point::new(local.x1, local.y1),
            Point::new(local.x0, local.y1),
        ]
        .map(|p| affine * p);
        points_bounds(&corners)
    }

    /// Check if a canvas point hits this annotation.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let affine = self.affine();
        if affine.determinant().abs() < f64::EPSILON {
            return false;
        }
        let local = affine.inverse() * point;
        let scale = if self.shape.has_absolute_points() {
            1.0
        } else {
            self.transform.mean_scale().max(f64::EPSILON)
        };
        self.shape.hit_test_local(local, tolerance / scale)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.transform.left += delta.x;
        self.transform.top += delta.y;
    }

    /// Anisotropic rescale for a canvas size change: position, scale factors
    /// and every embedded point scale by the same per-axis ratios.
    pub fn rescale(&mut self, sx: f64, sy: f64) {
        self.transform.left *= sx;
        self.transform.top *= sy;
        self.transform.scale_x *= sx;
        self.transform.scale_y *= sy;
        self.shape.scale_points(sx, sy);
    }

    pub fn set_body_color(&mut self, color: SerializableColor) -> bool {
        self.shape.set_body_color(color)
    }
}
