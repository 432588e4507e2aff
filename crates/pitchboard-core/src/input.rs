//! Pointer input for the editor surface.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys held during a press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Whether the press should extend the current selection.
    pub fn extends_selection(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => position,
        }
    }

    /// Left-button press with no modifiers.
    pub fn press(position: Point) -> Self {
        PointerEvent::Down {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    /// Left-button release.
    pub fn release(position: Point) -> Self {
        PointerEvent::Up {
            position,
            button: MouseButton::Left,
        }
    }
}

const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks press/drag state between pointer events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub pointer_position: Point,
    pub modifiers: Modifiers,
    /// Whether the left button is held.
    pub is_dragging: bool,
    pub drag_start: Option<Point>,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
    double_click_detected: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event. Only the left button drives drags and double-clicks.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.pointer_position = event.position();
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
                modifiers,
            } => {
                self.modifiers = modifiers;
                self.double_click_detected = false;
                let now = Instant::now();
                let repeated = match (self.last_click_time, self.last_click_position) {
                    (Some(time), Some(pos)) => {
                        now.duration_since(time).as_millis() < DOUBLE_CLICK_TIME_MS
                            && pos.distance(position) < DOUBLE_CLICK_DISTANCE
                    }
                    _ => false,
                };
                if repeated {
                    self.double_click_detected = true;
                    // A third click starts a fresh sequence.
                    self.last_click_time = None;
                    self.last_click_position = None;
                } else {
                    self.last_click_time = Some(now);
                    self.last_click_position = Some(position);
                }
                self.is_dragging = true;
                self.drag_start = Some(position);
            }
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => {
                self.is_dragging = false;
                self.drag_start = None;
            }
            _ => {}
        }
    }

    /// Whether the most recent press completed a double-click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }

    pub fn drag_delta(&self) -> Option<Vec2> {
        self.drag_start.map(|start| self.pointer_position - start)
    }
}
