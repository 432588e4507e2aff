//! Pitch geometry: canvas dimensions and procedurally generated field markings.
//!
//! All markings are computed in a logical `(u, v)` space where `u` runs along
//! the play axis (goal line to goal line) and `v` runs across it. A single
//! [`FieldLayout::map_point`] converts to canvas pixels, swapping the axes for
//! vertical pitches, so no marking code needs to know about orientation.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use uuid::Uuid;

use crate::shapes::ShapeId;

/// Inset between the canvas edge and the pitch border.
pub const CANVAS_MARGIN: f64 = 12.0;

/// Number of straight segments used to approximate every arc.
pub const ARC_SEGMENTS: usize = 24;

/// Pitch grass colour painted behind all marks.
pub const PITCH_COLOR: &str = "#0b8d2f";

/// Colour of the field markings.
pub const MARK_COLOR: &str = "#ffffff";

/// Stroke width of the field markings.
pub const MARK_STROKE_WIDTH: f64 = 2.0;

/// Radius of the centre and penalty spots.
pub const SPOT_RADIUS: f64 = 3.0;

// Proportions of a regulation pitch (105 x 68 m).
const PENALTY_DEPTH: f64 = 0.16;
const PENALTY_WIDTH: f64 = 0.6;
const GOAL_DEPTH: f64 = 0.05;
const GOAL_WIDTH: f64 = 0.27;
const PENALTY_SPOT_DISTANCE: f64 = 0.105;
const CENTER_CIRCLE_RADIUS: f64 = 0.134;
const CORNER_ARC_RADIUS: f64 = 0.01;

/// How much of a full pitch is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PitchType {
    #[default]
    Full,
    Half,
    Third,
    Custom,
}

impl PitchType {
    /// Parse a pitch type name, falling back to [`PitchType::Full`] for
    /// anything unrecognised.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "half" => PitchType::Half,
            "third" => PitchType::Third,
            "custom" => PitchType::Custom,
            _ => PitchType::Full,
        }
    }

    /// Base canvas size for a horizontal pitch.
    fn base_size(self) -> Size {
        match self {
            PitchType::Full | PitchType::Custom => Size::new(900.0, 600.0),
            PitchType::Half => Size::new(450.0, 600.0),
            PitchType::Third => Size::new(300.0, 600.0),
        }
    }

    /// Factor that extrapolates the visible length to a full pitch length.
    pub fn length_scale(self) -> f64 {
        match self {
            PitchType::Half => 2.0,
            PitchType::Third => 3.0,
            PitchType::Full | PitchType::Custom => 1.0,
        }
    }
}

impl fmt::Display for PitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PitchType::Full => "Full",
            PitchType::Half => "Half",
            PitchType::Third => "Third",
            PitchType::Custom => "Custom",
        };
        f.write_str(name)
    }
}

/// Direction of the play axis on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Parse an orientation name, falling back to [`Orientation::Horizontal`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "vertical" => Orientation::Vertical,
            _ => Orientation::Horizontal,
        }
    }

    pub fn is_vertical(self) -> bool {
        self == Orientation::Vertical
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Orientation::Horizontal => "Horizontal",
            Orientation::Vertical => "Vertical",
        })
    }
}

/// Pitch type and orientation together; the only input that decides canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PitchSpec {
    pub pitch_type: PitchType,
    pub orientation: Orientation,
}

impl PitchSpec {
    pub fn new(pitch_type: PitchType, orientation: Orientation) -> Self {
        Self {
            pitch_type,
            orientation,
        }
    }

    /// Canvas size in pixels for this spec.
    pub fn dimensions(&self) -> Size {
        compute_dimensions(self.pitch_type, self.orientation)
    }
}

impl fmt::Display for PitchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pitch_type, self.orientation)
    }
}

/// Canvas pixel dimensions for a pitch type and orientation.
///
/// Vertical pitches swap width and height.
pub fn compute_dimensions(pitch_type: PitchType, orientation: Orientation) -> Size {
    let base = pitch_type.base_size();
    match orientation {
        Orientation::Horizontal => base,
        Orientation::Vertical => Size::new(base.height, base.width),
    }
}

/// What a background mark represents on the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Border,
    Midline,
    CenterCircle,
    CenterSpot,
    PenaltyArea,
    /// Goal box in front of the goal line.
    GoalBox,
    PenaltySpot,
    PenaltyArc,
    /// Half of the centre circle, drawn on half-pitch views.
    HalfwayArc,
    CornerArc,
}

/// Drawable geometry of a background mark, in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkGeometry {
    Line { start: Point, end: Point },
    Rect(Rect),
    /// Stroked, unfilled circle.
    Circle { center: Point, radius: f64 },
    /// Filled dot.
    Spot { center: Point, radius: f64 },
    /// Arc approximated by `ARC_SEGMENTS + 1` sampled points.
    Polyline(Vec<Point>),
}

/// A non-interactive pitch marking. Never persisted, never selectable.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundMark {
    pub(crate) id: ShapeId,
    pub kind: MarkKind,
    pub geometry: MarkGeometry,
}

impl BackgroundMark {
    pub fn new(kind: MarkKind, geometry: MarkGeometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            geometry,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Background marks always report `true`; the tag is what persistence filters on.
    pub fn is_background(&self) -> bool {
        true
    }
}

/// Logical field space for one pitch spec on one canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldLayout {
    /// Top-left corner of the pitch border.
    pub origin: Point,
    /// Visible length along the play axis.
    pub field_length: f64,
    /// Breadth across the play axis.
    pub field_breadth: f64,
    /// Length of the full pitch the visible field is cropped from.
    pub full_length: f64,
    pub orientation: Orientation,
}

impl FieldLayout {
    pub fn new(pitch_type: PitchType, orientation: Orientation, size: Size) -> Self {
        let field_width = size.width - CANVAS_MARGIN * 2.0;
        let field_height = size.height - CANVAS_MARGIN * 2.0;
        let (field_length, field_breadth) = if orientation.is_vertical() {
            (field_height, field_width)
        } else {
            (field_width, field_height)
        };
        Self {
            origin: Point::new(CANVAS_MARGIN, CANVAS_MARGIN),
            field_length,
            field_breadth,
            full_length: field_length * pitch_type.length_scale(),
            orientation,
        }
    }

    /// Convert a logical `(u, v)` field coordinate to a canvas point.
    pub fn map_point(&self, u: f64, v: f64) -> Point {
        if self.orientation.is_vertical() {
            Point::new(self.origin.x + v, self.origin.y + u)
        } else {
            Point::new(self.origin.x + u, self.origin.y + v)
        }
    }

    /// Axis-aligned canvas rectangle spanning two logical corners.
    pub fn rect_from_uv(&self, u1: f64, v1: f64, u2: f64, v2: f64) -> Rect {
        Rect::from_points(self.map_point(u1, v1), self.map_point(u2, v2))
    }

    /// Sample an arc around `(cu, cv)` from `start` to `end` radians, measured
    /// in logical space with `u` as the x axis.
    pub fn arc(&self, cu: f64, cv: f64, radius: f64, start: f64, end: f64) -> Vec<Point> {
        (0..=ARC_SEGMENTS)
            .map(|i| {
                let angle = start + (end - start) * i as f64 / ARC_SEGMENTS as f64;
                self.map_point(cu + radius * angle.cos(), cv + radius * angle.sin())
            })
            .collect()
    }

    pub fn penalty_depth(&self) -> f64 {
        self.full_length * PENALTY_DEPTH
    }

    pub fn penalty_width(&self) -> f64 {
        self.field_breadth * PENALTY_WIDTH
    }

    pub fn goal_depth(&self) -> f64 {
        self.full_length * GOAL_DEPTH
    }

    pub fn goal_width(&self) -> f64 {
        self.field_breadth * GOAL_WIDTH
    }

    pub fn penalty_spot_distance(&self) -> f64 {
        self.full_length * PENALTY_SPOT_DISTANCE
    }

    pub fn center_circle_radius(&self) -> f64 {
        self.field_breadth * CENTER_CIRCLE_RADIUS
    }

    /// The penalty arc shares the centre circle radius (9.15 m on a real pitch).
    pub fn penalty_arc_radius(&self) -> f64 {
        self.center_circle_radius()
    }

    pub fn corner_arc_radius(&self) -> f64 {
        self.full_length * CORNER_ARC_RADIUS
    }
}

/// Compute the ordered list of background marks for a pitch.
///
/// The border always comes first. Full and Custom pitches get both ends;
/// Half and Third get the near end only, with Half adding the halfway arc.
pub fn compute_field_markings(
    pitch_type: PitchType,
    orientation: Orientation,
    width: f64,
    height: f64,
) -> Vec<BackgroundMark> {
    let layout = FieldLayout::new(pitch_type, orientation, Size::new(width, height));
    let length = layout.field_length;
    let breadth = layout.field_breadth;

    let mut marks = vec![BackgroundMark::new(
        MarkKind::Border,
        MarkGeometry::Rect(layout.rect_from_uv(0.0, 0.0, length, breadth)),
    )];

    match pitch_type {
        PitchType::Full | PitchType::Custom => {
            marks.push(BackgroundMark::new(
                MarkKind::Midline,
                MarkGeometry::Line {
                    start: layout.map_point(length / 2.0, 0.0),
                    end: layout.map_point(length / 2.0, breadth),
                },
            ));
            let center = layout.map_point(length / 2.0, breadth / 2.0);
            marks.push(BackgroundMark::new(
                MarkKind::CenterCircle,
                MarkGeometry::Circle {
                    center,
                    radius: layout.center_circle_radius(),
                },
            ));
            marks.push(BackgroundMark::new(
                MarkKind::CenterSpot,
                MarkGeometry::Spot {
                    center,
                    radius: SPOT_RADIUS,
                },
            ));
            push_goal_end(&mut marks, &layout, 0.0, 1.0);
            push_goal_end(&mut marks, &layout, length, -1.0);
        }
        PitchType::Half => {
            push_goal_end(&mut marks, &layout, 0.0, 1.0);
            marks.push(BackgroundMark::new(
                MarkKind::HalfwayArc,
                MarkGeometry::Polyline(layout.arc(
                    length,
                    breadth / 2.0,
                    layout.center_circle_radius(),
                    FRAC_PI_2,
                    PI + FRAC_PI_2,
                )),
            ));
        }
        PitchType::Third => {
            push_goal_end(&mut marks, &layout, 0.0, 1.0);
        }
    }

    marks
}

/// Penalty area, goal box, spot, arc and both corner arcs for the goal line
/// at `goal_u`, with `direction` pointing into the field (+1 or -1).
fn push_goal_end(
    marks: &mut Vec<BackgroundMark>,
    layout: &FieldLayout,
    goal_u: f64,
    direction: f64,
) {
    let breadth = layout.field_breadth;
    let penalty_depth = layout.penalty_depth();
    let goal_depth = layout.goal_depth();

    let box_v = (breadth - layout.penalty_width()) / 2.0;
    marks.push(BackgroundMark::new(
        MarkKind::PenaltyArea,
        MarkGeometry::Rect(layout.rect_from_uv(
            goal_u,
            box_v,
            goal_u + direction * penalty_depth,
            box_v + layout.penalty_width(),
        )),
    ));

    let goal_v = (breadth - layout.goal_width()) / 2.0;
    marks.push(BackgroundMark::new(
        MarkKind::GoalBox,
        MarkGeometry::Rect(layout.rect_from_uv(
            goal_u,
            goal_v,
            goal_u + direction * goal_depth,
            goal_v + layout.goal_width(),
        )),
    ));

    let spot_u = goal_u + direction * layout.penalty_spot_distance();
    marks.push(BackgroundMark::new(
        MarkKind::PenaltySpot,
        MarkGeometry::Spot {
            center: layout.map_point(spot_u, breadth / 2.0),
            radius: SPOT_RADIUS,
        },
    ));

    // Only the part of the arc outside the penalty area is drawn.
    let radius = layout.penalty_arc_radius();
    let outside = (penalty_depth - layout.penalty_spot_distance()) / radius;
    let half_angle = outside.clamp(-1.0, 1.0).acos();
    let facing = if direction > 0.0 { 0.0 } else { PI };
    marks.push(BackgroundMark::new(
        MarkKind::PenaltyArc,
        MarkGeometry::Polyline(layout.arc(
            spot_u,
            breadth / 2.0,
            radius,
            facing - half_angle,
            facing + half_angle,
        )),
    ));

    let corner = layout.corner_arc_radius();
    let (near_start, far_start) = if direction > 0.0 {
        (0.0, -FRAC_PI_2)
    } else {
        (FRAC_PI_2, PI)
    };
    marks.push(BackgroundMark::new(
        MarkKind::CornerArc,
        MarkGeometry::Polyline(layout.arc(goal_u, 0.0, corner, near_start, near_start + FRAC_PI_2)),
    ));
    marks.push(BackgroundMark::new(
        MarkKind::CornerArc,
        MarkGeometry::Polyline(layout.arc(
            goal_u,
            breadth,
            corner,
            far_start,
            far_start + FRAC_PI_2,
        )),
    ));
}
