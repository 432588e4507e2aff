//! Training cone drawn as an upright triangle.

use super::{SerializableColor, ShapeKind, ShapeTrait, point_to_polyline_dist, polygon_contains};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

pub const CONE_WIDTH: f64 = 28.0;
pub const CONE_HEIGHT: f64 = 30.0;
pub const CONE_STROKE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cone {
    pub width: f64,
    pub height: f64,
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
}

impl Cone {
    pub fn new(fill: SerializableColor) -> Self {
        Self {
            width: CONE_WIDTH,
            height: CONE_HEIGHT,
            fill,
            stroke: SerializableColor::hex("#ea580c"),
        }
    }

    /// Apex then base corners, centred on the origin.
    pub fn triangle(&self) -> [Point; 3] {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [
            Point::new(0.0, -hh),
            Point::new(hw, hh),
            Point::new(-hw, hh),
        ]
    }
}

impl ShapeTrait for Cone {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Cone
    }

    fn local_bounds(&self) -> Rect {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        Rect::new(-hw, -hh, hw, hh)
    }

    fn hit_test_local(&self, point: Point, tolerance: f64) -> bool {
        let tri = self.triangle();
        if polygon_contains(&tri, point) {
            return true;
        }
        let closed = [tri[0], tri[1], tri[2], tri[0]];
        point_to_polyline_dist(point, &closed) <= tolerance
    }
}
