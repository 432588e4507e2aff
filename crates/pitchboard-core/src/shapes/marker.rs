//! Position marker: a coloured disc with a dark centre dot.

use super::{SerializableColor, ShapeKind, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

pub const MARKER_RADIUS: f64 = 10.0;
pub const MARKER_DOT_RADIUS: f64 = 3.0;
pub const MARKER_STROKE_WIDTH: f64 = 2.0;

/// Named sub-parts of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerPart {
    Body,
    CenterDot,
}

impl MarkerPart {
    pub const ALL: [MarkerPart; 2] = [MarkerPart::Body, MarkerPart::CenterDot];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub radius: f64,
    pub dot_radius: f64,
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
    pub dot_color: SerializableColor,
}

impl Marker {
    pub fn new(fill: SerializableColor) -> Self {
        Self {
            radius: MARKER_RADIUS,
            dot_radius: MARKER_DOT_RADIUS,
            fill,
            stroke: SerializableColor::white(),
            dot_color: SerializableColor::hex("#111827"),
        }
    }

    pub fn part_fill(&self, part: MarkerPart) -> SerializableColor {
        match part {
            MarkerPart::Body => self.fill,
            MarkerPart::CenterDot => self.dot_color,
        }
    }

    pub fn part_radius(&self, part: MarkerPart) -> f64 {
        match part {
            MarkerPart::Body => self.radius,
            MarkerPart::CenterDot => self.dot_radius,
        }
    }
}

impl ShapeTrait for Marker {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Marker
    }

    fn local_bounds(&self) -> Rect {
        let r = self.radius + MARKER_STROKE_WIDTH / 2.0;
        Rect::new(-r, -r, r, r)
    }

    fn hit_test_local(&self, point: Point, tolerance: f64) -> bool {
        point.to_vec2().hypot() <= self.radius + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recolor_keeps_dot() {
        let mut m = Marker::new(SerializableColor::hex("#facc15"));
        m.fill = SerializableColor::hex("#22c55e");
        assert_eq!(m.part_fill(MarkerPart::Body).to_string(), "#22c55e");
        assert_eq!(m.part_fill(MarkerPart::CenterDot).to_string(), "#111827");
    }
}
