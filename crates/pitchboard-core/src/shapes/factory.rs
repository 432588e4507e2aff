//! Constructors for ready-to-place annotations with their default styling.

use super::{
    Annotation, ArrowOrLine, Ball, Cone, FreehandStroke, LineStyle, Marker, PlayerToken,
    SerializableColor, Shape, Team, TextLabel, Transform,
};
use kurbo::Point;

pub const PLAYER_SPOT: Point = Point::new(80.0, 80.0);
pub const CONE_SPOT: Point = Point::new(100.0, 100.0);
pub const BALL_SPOT: Point = Point::new(140.0, 80.0);
pub const MARKER_SPOT: Point = Point::new(120.0, 120.0);
pub const TEXT_SPOT: Point = Point::new(80.0, 160.0);

pub const CONE_FILL: &str = "#f97316";
pub const MARKER_FILL: &str = "#facc15";
pub const ANNOTATION_COLOR: &str = "#ffd60a";

pub fn player(label: &str, fill: SerializableColor, stroke: SerializableColor) -> Annotation {
    Annotation::new(
        Shape::Player(PlayerToken::new(label, fill, stroke)),
        Transform::at(PLAYER_SPOT),
    )
}

pub fn team_player(team: Team, label: &str) -> Annotation {
    Annotation::new(
        Shape::Player(PlayerToken::for_team(team, label)),
        Transform::at(PLAYER_SPOT),
    )
}

pub fn ball() -> Annotation {
    Annotation::new(Shape::Ball(Ball::default()), Transform::at(BALL_SPOT))
}

pub fn cone(fill: SerializableColor) -> Annotation {
    Annotation::new(Shape::Cone(Cone::new(fill)), Transform::at(CONE_SPOT))
}

pub fn marker(fill: SerializableColor) -> Annotation {
    Annotation::new(Shape::Marker(Marker::new(fill)), Transform::at(MARKER_SPOT))
}

pub fn text(default_text: &str, fill: SerializableColor) -> Annotation {
    Annotation::new(
        Shape::Text(TextLabel::new(default_text, fill)),
        Transform::at(TEXT_SPOT),
    )
}

/// Line or arrow between two canvas points.
pub fn line(style: LineStyle, start: Point, end: Point, color: SerializableColor) -> Annotation {
    Annotation::new(
        Shape::Arrow(ArrowOrLine::new(style, start, end, color)),
        Transform::default(),
    )
}

/// Smoothed brush stroke through raw pointer samples.
pub fn freehand(points: &[Point], color: SerializableColor, width: f64) -> Annotation {
    Annotation::new(
        Shape::Freehand(FreehandStroke::from_points(points, color, width)),
        Transform::default(),
    )
}
