//! Brush strokes, smoothed into quadratic path commands.

use super::{SerializableColor, ShapeKind, ShapeTrait, point_to_polyline_dist, points_bounds};
use kurbo::{BezPath, Point, Rect};
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Raw samples closer than this to the simplified path are dropped.
pub const CAPTURE_TOLERANCE: f64 = 0.4;
/// Samples per quadratic when flattening for hit testing.
const QUAD_SAMPLES: usize = 8;

/// One drawing command. Serialized as `["M", x, y]`, `["L", x, y]` or
/// `["Q", cx, cy, x, y]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
}

impl PathCommand {
    fn letter(&self) -> &'static str {
        match self {
            PathCommand::MoveTo(_) => "M",
            PathCommand::LineTo(_) => "L",
            PathCommand::QuadTo(..) => "Q",
        }
    }

    fn points(&self) -> Vec<Point> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => vec![p],
            PathCommand::QuadTo(c, p) => vec![c, p],
        }
    }

    fn map_points(&mut self, f: impl Fn(Point) -> Point) {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => *p = f(*p),
            PathCommand::QuadTo(c, p) => {
                *c = f(*c);
                *p = f(*p);
            }
        }
    }
}

impl Serialize for PathCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let points = self.points();
        let mut seq = serializer.serialize_seq(Some(1 + points.len() * 2))?;
        seq.serialize_element(self.letter())?;
        for p in points {
            seq.serialize_element(&p.x)?;
            seq.serialize_element(&p.y)?;
        }
        seq.end()
    }
}

struct PathCommandVisitor;

impl<'de> Visitor<'de> for PathCommandVisitor {
    type Value = PathCommand;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a path command array such as [\"M\", x, y]")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let letter: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let mut coords = Vec::with_capacity(4);
        while let Some(v) = seq.next_element::<f64>()? {
            coords.push(v);
        }
        match (letter.as_str(), coords.as_slice()) {
            ("M", &[x, y]) => Ok(PathCommand::MoveTo(Point::new(x, y))),
            ("L", &[x, y]) => Ok(PathCommand::LineTo(Point::new(x, y))),
            ("Q", &[cx, cy, x, y]) => Ok(PathCommand::QuadTo(Point::new(cx, cy), Point::new(x, y))),
            _ => Err(de::Error::custom(format!(
                "unsupported path command {letter} with {} coordinates",
                coords.len()
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for PathCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(PathCommandVisitor)
    }
}

/// A completed brush stroke in absolute canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreehandStroke {
    pub path: Vec<PathCommand>,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
}

impl FreehandStroke {
    /// Build a smoothed stroke from raw pointer samples.
    ///
    /// Each sample becomes the control point of a quadratic ending halfway to
    /// the next sample; the stroke closes with a line to the last sample.
    pub fn from_points(points: &[Point], stroke: SerializableColor, stroke_width: f64) -> Self {
        let points = rdp_simplify(points, CAPTURE_TOLERANCE);
        let mut path = Vec::with_capacity(points.len() + 1);
        if let Some(&first) = points.first() {
            path.push(PathCommand::MoveTo(first));
            for w in points.windows(2) {
                path.push(PathCommand::QuadTo(w[0], w[0].midpoint(w[1])));
            }
            path.push(PathCommand::LineTo(points[points.len() - 1]));
        }
        Self {
            path,
            stroke,
            stroke_width,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut bez = BezPath::new();
        for cmd in &self.path {
            match *cmd {
                PathCommand::MoveTo(p) => bez.move_to(p),
                PathCommand::LineTo(p) => bez.line_to(p),
                PathCommand::QuadTo(c, p) => bez.quad_to(c, p),
            }
        }
        bez
    }

    /// Polyline approximation of the path.
    pub fn flatten(&self) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::new();
        for cmd in &self.path {
            match *cmd {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => out.push(p),
                PathCommand::QuadTo(c, p) => {
                    let from = out.last().copied().unwrap_or(c);
                    for i in 1..=QUAD_SAMPLES {
                        let t = i as f64 / QUAD_SAMPLES as f64;
                        let a = from.lerp(c, t);
                        let b = c.lerp(p, t);
                        out.push(a.lerp(b, t));
                    }
                }
            }
        }
        out
    }
}

/// Ramer-Douglas-Peucker line simplification.
fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = super::point_to_segment_dist(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp_simplify(&points[..=max_index], tolerance);
        let right = rdp_simplify(&points[max_index..], tolerance);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

impl ShapeTrait for FreehandStroke {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Freehand
    }

    fn local_bounds(&self) -> Rect {
        let points: Vec<Point> = self.path.iter().flat_map(|c| c.points()).collect();
        let pad = self.stroke_width / 2.0;
        points_bounds(&points).inflate(pad, pad)
    }

    fn hit_test_local(&self, point: Point, tolerance: f64) -> bool {
        let polyline = self.flatten();
        !polyline.is_empty()
            && point_to_polyline_dist(point, &polyline) <= tolerance + self.stroke_width / 2.0
    }

    fn scale_points(&mut self, sx: f64, sy: f64) {
        for cmd in &mut self.path {
            cmd.map_points(|p| Point::new(p.x * sx, p.y * sy));
        }
    }

    fn has_absolute_points(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white() -> SerializableColor {
        SerializableColor::white()
    }

    #[test]
    fn test_smoothing_structure() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 0.0),
        ];
        let stroke = FreehandStroke::from_points(&pts, white(), 3.0);
        assert_eq!(
            stroke.path,
            vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::QuadTo(Point::new(0.0, 0.0), Point::new(5.0, 5.0)),
                PathCommand::QuadTo(Point::new(10.0, 10.0), Point::new(15.0, 5.0)),
                PathCommand::LineTo(Point::new(20.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_collinear_samples_collapse() {
        let pts: Vec<Point> = (0..20).map(|i| Point::new(i as f64, 0.0)).collect();
        let stroke = FreehandStroke::from_points(&pts, white(), 3.0);
        assert_eq!(stroke.path.len(), 3);
    }

    #[test]
    fn test_path_command_json() {
        let cmds = vec![
            PathCommand::MoveTo(Point::new(1.0, 2.0)),
            PathCommand::QuadTo(Point::new(3.0, 4.0), Point::new(5.5, 6.0)),
            PathCommand::LineTo(Point::new(7.0, 8.0)),
        ];
        let json = serde_json::to_string(&cmds).unwrap();
        assert_eq!(json, r#"[["M",1.0,2.0],["Q",3.0,4.0,5.5,6.0],["L",7.0,8.0]]"#);
        let back: Vec<PathCommand> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmds);
    }

    #[test]
    fn test_path_command_rejects_bad_arity() {
        assert!(serde_json::from_str::<PathCommand>(r#"["Q",1,2]"#).is_err());
        assert!(serde_json::from_str::<PathCommand>(r#"["C",1,2,3,4,5,6]"#).is_err());
        assert!(serde_json::from_str::<PathCommand>(r#"["M",1,2]"#).is_ok());
    }

    #[test]
    fn test_scale_alternates_axes() {
        let mut stroke = FreehandStroke::from_points(
            &[Point::new(10.0, 10.0), Point::new(20.0, 40.0)],
            white(),
            3.0,
        );
        stroke.scale_points(2.0, 0.5);
        assert_eq!(stroke.path[0], PathCommand::MoveTo(Point::new(20.0, 5.0)));
        assert_eq!(stroke.path[2], PathCommand::LineTo(Point::new(40.0, 20.0)));
    }

    #[test]
    fn test_hit_test_near_curve() {
        let stroke = FreehandStroke::from_points(
            &[Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(100.0, 40.0)],
            white(),
            3.0,
        );
        assert!(stroke.hit_test_local(Point::new(0.0, 1.0), 0.0));
        assert!(stroke.hit_test_local(Point::new(100.0, 40.0), 0.0));
        assert!(!stroke.hit_test_local(Point::new(0.0, 60.0), 2.0));
    }

    #[test]
    fn test_single_point_stroke() {
        let stroke = FreehandStroke::from_points(&[Point::new(5.0, 5.0)], white(), 3.0);
        assert_eq!(stroke.path.len(), 2);
        assert!(stroke.hit_test_local(Point::new(6.0, 5.0), 0.0));
    }
}
