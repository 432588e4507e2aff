//! Lines and arrows between two points, in seven styles.

use super::{
    SerializableColor, ShapeKind, ShapeTrait, point_to_polyline_dist, points_bounds,
    polygon_contains,
};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

pub const LINE_STROKE_WIDTH: f64 = 3.0;
pub const DASH_PATTERN: [f64; 2] = [10.0, 6.0];
pub const HEAD_WIDTH: f64 = 14.0;
pub const HEAD_LENGTH: f64 = 16.0;

const WAVE_AMPLITUDE: f64 = 6.0;
const WAVE_LENGTH: f64 = 60.0;
const WAVE_STEP: f64 = 12.0;
const MIN_WAVES: f64 = 2.0;
const MIN_STEPS: f64 = 10.0;

/// Visual style of a line annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    #[default]
    Arrow,
    DashedArrow,
    DoubleArrow,
    Line,
    DashedLine,
    WavyLine,
    WavyArrow,
}

impl LineStyle {
    pub const ALL: [LineStyle; 7] = [
        LineStyle::Arrow,
        LineStyle::DashedArrow,
        LineStyle::DoubleArrow,
        LineStyle::Line,
        LineStyle::DashedLine,
        LineStyle::WavyLine,
        LineStyle::WavyArrow,
    ];

    pub fn is_dashed(self) -> bool {
        matches!(self, LineStyle::DashedArrow | LineStyle::DashedLine)
    }

    pub fn is_wavy(self) -> bool {
        matches!(self, LineStyle::WavyLine | LineStyle::WavyArrow)
    }

    pub fn has_start_head(self) -> bool {
        self == LineStyle::DoubleArrow
    }

    pub fn has_end_head(self) -> bool {
        matches!(
            self,
            LineStyle::Arrow
                | LineStyle::DashedArrow
                | LineStyle::DoubleArrow
                | LineStyle::WavyArrow
        )
    }

    pub fn has_heads(self) -> bool {
        self.has_start_head() || self.has_end_head()
    }

    pub fn dash_array(self) -> Option<Vec<f64>> {
        self.is_dashed().then(|| DASH_PATTERN.to_vec())
    }

    pub fn name(self) -> &'static str {
        match self {
            LineStyle::Arrow => "arrow",
            LineStyle::DashedArrow => "dashed-arrow",
            LineStyle::DoubleArrow => "double-arrow",
            LineStyle::Line => "line",
            LineStyle::DashedLine => "dashed-line",
            LineStyle::WavyLine => "wavy-line",
            LineStyle::WavyArrow => "wavy-arrow",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sample a sinusoid running from `start` to `end`.
///
/// Wave count and step count grow with the length; the offset is zero at
/// both ends. Segments shorter than two units collapse to the endpoints.
pub fn wavy_points(start: Point, end: Point) -> Vec<Point> {
    let delta = end - start;
    let length = delta.hypot();
    if length < 2.0 {
        return vec![start, end];
    }
    let waves = MIN_WAVES.max((length / WAVE_LENGTH).round());
    let steps = MIN_STEPS.max((length / WAVE_STEP).round()) as usize;
    let unit = delta / length;
    let normal = Vec2::new(-unit.y, unit.x);
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let offset = (t * waves * 2.0 * PI).sin() * WAVE_AMPLITUDE;
            start + delta * t + normal * offset
        })
        .collect()
}

/// Triangular head centred on a line endpoint, tip pointing along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    pub center: Point,
    pub direction: Vec2,
    pub width: f64,
    pub length: f64,
}

impl Arrowhead {
    /// Tip, then the two base corners.
    pub fn polygon(&self) -> [Point; 3] {
        let perp = Vec2::new(-self.direction.y, self.direction.x);
        let half_len = self.direction * (self.length / 2.0);
        let half_width = perp * (self.width / 2.0);
        let base = self.center - half_len;
        [self.center + half_len, base + half_width, base - half_width]
    }

    /// Rotation of the head in degrees, with zero meaning an upward tip.
    pub fn angle_degrees(&self) -> f64 {
        self.direction.y.atan2(self.direction.x).to_degrees() + 90.0
    }
}

fn unit_or_x(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len < f64::EPSILON { Vec2::new(1.0, 0.0) } else { v / len }
}

/// A two-point line annotation. Points are absolute canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowOrLine {
    pub style: LineStyle,
    pub points: [Point; 2],
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dash_array: Option<Vec<f64>>,
}

impl ArrowOrLine {
    pub fn new(style: LineStyle, start: Point, end: Point, stroke: SerializableColor) -> Self {
        Self {
            style,
            points: [start, end],
            stroke,
            stroke_width: LINE_STROKE_WIDTH,
            stroke_dash_array: style.dash_array(),
        }
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[1]
    }

    pub fn set_end(&mut self, end: Point) {
        self.points[1] = end;
    }

    pub fn length(&self) -> f64 {
        (self.end() - self.start()).hypot()
    }

    /// Polyline of the shaft: straight or sampled wave.
    pub fn shaft_points(&self) -> Vec<Point> {
        if self.style.is_wavy() {
            wavy_points(self.start(), self.end())
        } else {
            vec![self.start(), self.end()]
        }
    }

    /// Heads for the current style, oriented along the nearest shaft segment.
    pub fn heads(&self, scale: f64) -> Vec<Arrowhead> {
        let shaft = self.shaft_points();
        let n = shaft.len();
        let head = |center: Point, from: Point| Arrowhead {
            center,
            direction: unit_or_x(center - from),
            width: HEAD_WIDTH * scale,
            length: HEAD_LENGTH * scale,
        };
        let mut heads = Vec::with_capacity(2);
        if self.style.has_start_head() {
            heads.push(head(shaft[0], shaft[1]));
        }
        if self.style.has_end_head() {
            heads.push(head(shaft[n - 1], shaft[n - 2]));
        }
        heads
    }
}

impl ShapeTrait for ArrowOrLine {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Arrow
    }

    fn local_bounds(&self) -> Rect {
        let mut points = self.shaft_points();
        for head in self.heads(1.0) {
            points.extend(head.polygon());
        }
        let pad = self.stroke_width / 2.0;
        points_bounds(&points).inflate(pad, pad)
    }

    fn hit_test_local(&self, point: Point, tolerance: f64) -> bool {
        let shaft = self.shaft_points();
        if point_to_polyline_dist(point, &shaft) <= tolerance + self.stroke_width / 2.0 {
            return true;
        }
        self.heads(1.0)
            .iter()
            .any(|h| polygon_contains(&h.polygon(), point))
    }

    fn scale_points(&mut self, sx: f64, sy: f64) {
        for p in &mut self.points {
            *p = Point::new(p.x * sx, p.y * sy);
        }
    }

    fn has_absolute_points(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yellow() -> SerializableColor {
        SerializableColor::hex("#ffd60a")
    }

    #[test]
    fn test_wavy_midpoint_on_axis() {
        let pts = wavy_points(Point::ZERO, Point::new(120.0, 0.0));
        assert_eq!(pts.len(), 11);
        assert!(pts[5].y.abs() < 1e-9);
        assert!((pts[5].x - 60.0).abs() < 1e-9);
        assert_eq!(pts[0], Point::ZERO);
        assert!((pts[10].x - 120.0).abs() < 1e-9 && pts[10].y.abs() < 1e-9);
    }

    #[test]
    fn test_wavy_amplitude_bounded() {
        let pts = wavy_points(Point::new(10.0, 10.0), Point::new(10.0, 400.0));
        assert!(pts.iter().all(|p| (p.x - 10.0).abs() <= WAVE_AMPLITUDE + 1e-9));
        assert!(pts.iter().any(|p| (p.x - 10.0).abs() > 1.0));
        assert_eq!(pts.len(), 34);
    }

    #[test]
    fn test_wavy_degenerate() {
        let a = Point::new(5.0, 5.0);
        let b = Point::new(6.0, 5.5);
        assert_eq!(wavy_points(a, b), vec![a, b]);
    }

    #[test]
    fn test_head_counts_per_style() {
        let counts: Vec<usize> = LineStyle::ALL
            .iter()
            .map(|&s| {
                ArrowOrLine::new(s, Point::ZERO, Point::new(100.0, 0.0), yellow())
                    .heads(1.0)
                    .len()
            })
            .collect();
        assert_eq!(counts, vec![1, 1, 2, 0, 0, 0, 1]);
    }

    #[test]
    fn test_dash_only_on_dashed() {
        for style in LineStyle::ALL {
            let line = ArrowOrLine::new(style, Point::ZERO, Point::new(50.0, 0.0), yellow());
            assert_eq!(line.stroke_dash_array.is_some(), style.is_dashed());
        }
    }

    #[test]
    fn test_head_centred_on_end() {
        let arrow = ArrowOrLine::new(
            LineStyle::Arrow,
            Point::ZERO,
            Point::new(100.0, 0.0),
            yellow(),
        );
        let head = arrow.heads(1.0)[0];
        assert_eq!(head.center, Point::new(100.0, 0.0));
        let [tip, a, b] = head.polygon();
        assert!((tip.x - 108.0).abs() < 1e-9);
        assert!((a.x - 92.0).abs() < 1e-9 && (b.x - 92.0).abs() < 1e-9);
        assert!(((a.y - b.y).abs() - 14.0).abs() < 1e-9);
        assert!((head.angle_degrees() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_double_arrow_heads_point_outward() {
        let arrow = ArrowOrLine::new(
            LineStyle::DoubleArrow,
            Point::new(0.0, 0.0),
            Point::new(0.0, 50.0),
            yellow(),
        );
        let heads = arrow.heads(1.0);
        assert!(heads[0].direction.y < 0.0);
        assert!(heads[1].direction.y > 0.0);
    }

    #[test]
    fn test_set_end_updates_heads() {
        let mut arrow = ArrowOrLine::new(
            LineStyle::Arrow,
            Point::ZERO,
            Point::new(10.0, 0.0),
            yellow(),
        );
        arrow.set_end(Point::new(0.0, 80.0));
        let head = arrow.heads(1.0)[0];
        assert_eq!(head.center, Point::new(0.0, 80.0));
        assert!((head.direction.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_shaft_and_head() {
        let arrow = ArrowOrLine::new(
            LineStyle::Arrow,
            Point::ZERO,
            Point::new(100.0, 0.0),
            yellow(),
        );
        assert!(arrow.hit_test_local(Point::new(50.0, 1.0), 0.0));
        assert!(arrow.hit_test_local(Point::new(104.0, 0.5), 0.0));
        assert!(!arrow.hit_test_local(Point::new(50.0, 20.0), 2.0));
    }

    #[test]
    fn test_style_names_roundtrip() {
        for style in LineStyle::ALL {
            assert_eq!(LineStyle::from_name(style.name()), Some(style));
            let json = serde_json::to_string(&style).unwrap();
            assert_eq!(json, format!("\"{}\"", style.name()));
        }
    }
}
