//! Player token: a filled circle with a short centred label.

use super::{SerializableColor, ShapeKind, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

pub const PLAYER_RADIUS: f64 = 18.0;
pub const PLAYER_FONT_SIZE: f64 = 12.0;
pub const PLAYER_STROKE_WIDTH: f64 = 2.0;
/// Longest label a token can carry.
pub const MAX_LABEL_CHARS: usize = 3;

/// Which side a player belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Team {
    Home,
    Away,
}

impl Team {
    /// Label used when the user supplies none.
    pub fn default_label(self) -> &'static str {
        match self {
            Team::Home => "H",
            Team::Away => "A",
        }
    }

    /// Body fill and outline for the team's tokens.
    pub fn colors(self) -> (SerializableColor, SerializableColor) {
        match self {
            Team::Home => (
                SerializableColor::hex("#2563eb"),
                SerializableColor::hex("#1d4ed8"),
            ),
            Team::Away => (
                SerializableColor::hex("#dc2626"),
                SerializableColor::hex("#b91c1c"),
            ),
        }
    }
}

/// Named sub-parts of a player token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerPart {
    Body,
    Label,
}

impl PlayerPart {
    /// Drawing order, back to front.
    pub const ALL: [PlayerPart; 2] = [PlayerPart::Body, PlayerPart::Label];
}

/// Trim, uppercase and cut to three characters.
pub fn sanitize_label(label: &str) -> String {
    label.trim().to_uppercase().chars().take(MAX_LABEL_CHARS).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerToken {
    pub label: String,
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
    pub radius: f64,
    pub font_size: f64,
    pub label_color: SerializableColor,
}

impl PlayerToken {
    pub fn new(label: &str, fill: SerializableColor, stroke: SerializableColor) -> Self {
        Self {
            label: sanitize_label(label),
            fill,
            stroke,
            radius: PLAYER_RADIUS,
            font_size: PLAYER_FONT_SIZE,
            label_color: SerializableColor::white(),
        }
    }

    /// Token in team colours; an empty label falls back to the team initial.
    pub fn for_team(team: Team, label: &str) -> Self {
        let (fill, stroke) = team.colors();
        let mut token = Self::new(label, fill, stroke);
        if token.label.is_empty() {
            token.label = team.default_label().to_string();
        }
        token
    }

    pub fn part_fill(&self, part: PlayerPart) -> SerializableColor {
        match part {
            PlayerPart::Body => self.fill,
            PlayerPart::Label => self.label_color,
        }
    }
}

impl ShapeTrait for PlayerToken {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Player
    }

    fn local_bounds(&self) -> Rect {
        let r = self.radius + PLAYER_STROKE_WIDTH / 2.0;
        Rect::new(-r, -r, r, r)
    }

    fn hit_test_local(&self, point: Point, tolerance: f64) -> bool {
        point.to_vec2().hypot() <= self.radius + tolerance
    }
}
