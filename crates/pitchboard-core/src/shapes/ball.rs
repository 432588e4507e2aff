//! Football: white disc with a pentagon core and five surrounding patches.

use super::{SerializableColor, ShapeKind, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const BALL_RADIUS: f64 = 12.0;
pub const BALL_STROKE_WIDTH: f64 = 1.5;

const CORE_RADIUS: f64 = 0.35;
const PATCH_DISTANCE: f64 = 0.78;
const PATCH_RADIUS: f64 = 0.22;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ball {
    pub radius: f64,
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
    pub patch_color: SerializableColor,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            fill: SerializableColor::white(),
            stroke: SerializableColor::hex("#1f2937"),
            patch_color: SerializableColor::hex("#111827"),
        }
    }
}

fn pentagon(center: Point, radius: f64, rotation: f64) -> Vec<Point> {
    (0..5)
        .map(|k| {
            let a = rotation + k as f64 * 2.0 * PI / 5.0;
            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

impl Ball {
    /// Central pentagon followed by the five outer patches, in local coordinates.
    pub fn patches(&self) -> Vec<Vec<Point>> {
        let up = -PI / 2.0;
        let mut patches = vec![pentagon(Point::ZERO, self.radius * CORE_RADIUS, up)];
        for k in 0..5 {
            let a = up + k as f64 * 2.0 * PI / 5.0;
            let d = self.radius * PATCH_DISTANCE;
            let center = Point::new(d * a.cos(), d * a.sin());
            patches.push(pentagon(center, self.radius * PATCH_RADIUS, a));
        }
        patches
    }
}

impl ShapeTrait for Ball {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Ball
    }

    fn local_bounds(&self) -> Rect {
        let r = self.radius + BALL_STROKE_WIDTH / 2.0;
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
    fn test_patches_inside_disc() {
        let ball = Ball::default();
        let patches = ball.patches();
        assert_eq!(patches.len(), 6);
        for patch in &patches {
            assert_eq!(patch.len(), 5);
            for p in patch {
                assert!(p.to_vec2().hypot() <= ball.radius + 1e-9);
            }
        }
    }

    #[test]
    fn test_first_patch_points_up() {
        let patches = Ball::default().patches();
        let top = &patches[1];
        let cx = top.iter().map(|p| p.x).sum::<f64>() / 5.0;
        let cy = top.iter().map(|p| p.y).sum::<f64>() / 5.0;
        assert!(cx.abs() < 1e-9);
        assert!(cy < 0.0);
    }
}
