//! Tool system: the interaction state machine driving the canvas.

use crate::canvas::{BrushSettings, Canvas};
use crate::config::EditorConfig;
use crate::input::Modifiers;
use crate::shapes::{Annotation, LineStyle, SerializableColor, ShapeId, factory};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Lines shorter than this on release are discarded.
pub const MIN_LINE_LENGTH: f64 = 1.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Brush,
    /// One drawing tool per line style.
    Draw(LineStyle),
}

/// What happens after a line or arrow is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineFinishPolicy {
    /// The drawing tool stays active for the next line.
    #[default]
    KeepTool,
    /// Switch back to selection, as placement tools do.
    ReturnToSelect,
}

/// State of a tool interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ToolState {
    #[default]
    Idle,
    /// A provisional line or arrow is following the pointer.
    Drawing { anchor: Point, provisional: ShapeId },
    /// The selection is being dragged.
    Moving { last: Point },
    /// A brush stroke is being captured.
    Stroking,
}

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    pub current_tool: ToolKind,
    pub state: ToolState,
    finish_policy: LineFinishPolicy,
    line_color: SerializableColor,
    brush: BrushSettings,
    hit_tolerance: f64,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl ToolManager {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            finish_policy: config.line_finish_policy,
            line_color: config.annotation_color,
            brush: BrushSettings {
                color: config.brush_color,
                width: config.brush_width,
            },
            hit_tolerance: config.hit_tolerance,
        }
    }

    /// Switch tools. Any provisional shape is dropped and every annotation
    /// becomes interactive again; the brush tool turns on free drawing.
    pub fn set_tool(&mut self, canvas: &mut Canvas, tool: ToolKind) {
        self.cancel(canvas);
        canvas.set_interactive_all(true);
        canvas.set_drawing_mode((tool == ToolKind::Brush).then_some(self.brush));
        if tool != self.current_tool {
            log::debug!("tool {:?} -> {:?}", self.current_tool, tool);
        }
        self.current_tool = tool;
    }

    /// Abandon the interaction in progress.
    pub fn cancel(&mut self, canvas: &mut Canvas) {
        match self.state {
            ToolState::Drawing { provisional, .. } => {
                log::debug!("discarding provisional shape {provisional}");
                canvas.remove(provisional);
            }
            ToolState::Stroking => canvas.discard_stroke(),
            ToolState::Idle | ToolState::Moving { .. } => {}
        }
        self.state = ToolState::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.state != ToolState::Idle
    }

    /// Provisional shape being drawn, if any.
    pub fn provisional(&self) -> Option<ShapeId> {
        match self.state {
            ToolState::Drawing { provisional, .. } => Some(provisional),
            _ => None,
        }
    }

    /// One-shot placement: add the shape, select it, return to `Select`.
    pub fn place(&mut self, canvas: &mut Canvas, annotation: Annotation) -> ShapeId {
        self.set_tool(canvas, ToolKind::Select);
        let id = canvas.add_and_select(annotation);
        log::debug!("placed {:?} {id}", canvas.annotation(id).map(Annotation::kind));
        id
    }

    pub fn pointer_down(&mut self, canvas: &mut Canvas, point: Point, modifiers: Modifiers) {
        if self.is_active() {
            self.cancel(canvas);
        }
        match self.current_tool {
            ToolKind::Draw(style) => {
                canvas.clear_selection();
                let mut line = factory::line(style, point, point, self.line_color);
                line.interactive = false;
                let provisional = canvas.add(line);
                log::debug!("provisional {style} {provisional}");
                self.state = ToolState::Drawing {
                    anchor: point,
                    provisional,
                };
            }
            ToolKind::Brush => {
                if canvas.begin_stroke(point) {
                    self.state = ToolState::Stroking;
                }
            }
            ToolKind::Select => match canvas.hit_test(point, self.hit_tolerance) {
                Some(id) => {
                    if modifiers.extends_selection() {
                        canvas.add_to_selection(id);
                    } else if !canvas.is_selected(id) {
                        canvas.select(id);
                    }
                    self.state = ToolState::Moving { last: point };
                }
                None => {
                    if !modifiers.extends_selection() {
                        canvas.clear_selection();
                    }
                }
            },
        }
    }

    pub fn pointer_move(&mut self, canvas: &mut Canvas, point: Point) {
        match &mut self.state {
            ToolState::Drawing { provisional, .. } => {
                if let Some(line) = canvas
                    .annotation_mut(*provisional)
                    .and_then(|a| a.shape.as_arrow_mut())
                {
                    line.set_end(point);
                }
            }
            ToolState::Moving { last } => {
                canvas.translate_selected(point - *last);
                *last = point;
            }
            ToolState::Stroking => canvas.extend_stroke(point),
            ToolState::Idle => {}
        }
    }

    /// Finish the interaction. Returns the id of a newly created shape.
    pub fn pointer_up(&mut self, canvas: &mut Canvas, point: Point) -> Option<ShapeId> {
        self.pointer_move(canvas, point);
        let state = std::mem::take(&mut self.state);
        match state {
            ToolState::Drawing { anchor, provisional } => {
                if anchor.distance(point) < MIN_LINE_LENGTH {
                    canvas.remove(provisional);
                    return None;
                }
                self.finish_line(canvas, provisional)
            }
            ToolState::Stroking => canvas.end_stroke(),
            ToolState::Moving { .. } | ToolState::Idle => None,
        }
    }

    fn finish_line(&mut self, canvas: &mut Canvas, id: ShapeId) -> Option<ShapeId> {
        let style = canvas
            .annotation(id)
            .and_then(|a| a.shape.as_arrow())
            .map(|line| line.style)?;
        canvas.set_interactive(id, true);
        if style.has_heads() {
            canvas.select(id);
        }
        log::debug!("finished {style} {id}");
        if self.finish_policy == LineFinishPolicy::ReturnToSelect {
            self.set_tool(canvas, ToolKind::Select);
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ShapeKind, Team, Transform};
    use kurbo::Size;

    fn setup(tool: ToolKind) -> (ToolManager, Canvas) {
        let mut canvas = Canvas::new(Size::new(900.0, 600.0));
        let mut tm = ToolManager::default();
        tm.set_tool(&mut canvas, tool);
        (tm, canvas)
    }

    fn drag(tm: &mut ToolManager, canvas: &mut Canvas, from: Point, to: Point) -> Option<ShapeId> {
        tm.pointer_down(canvas, from, Modifiers::NONE);
        tm.pointer_move(canvas, from.midpoint(to));
        tm.pointer_up(canvas, to)
    }

    #[test]
    fn test_tool_selection() {
        let (mut tm, mut canvas) = setup(ToolKind::Select);
        assert_eq!(tm.current_tool, ToolKind::Select);
        tm.set_tool(&mut canvas, ToolKind::Draw(LineStyle::Arrow));
        assert_eq!(tm.current_tool, ToolKind::Draw(LineStyle::Arrow));
        assert!(canvas.drawing_mode().is_none());
    }

    #[test]
    fn test_provisional_follows_pointer() {
        let (mut tm, mut canvas) = setup(ToolKind::Draw(LineStyle::Arrow));
        tm.pointer_down(&mut canvas, Point::new(10.0, 10.0), Modifiers::NONE);
        let id = tm.provisional().unwrap();
        assert!(!canvas.annotation(id).unwrap().is_interactive());

        tm.pointer_move(&mut canvas, Point::new(60.0, 40.0));
        let line = canvas.annotation(id).unwrap().shape.as_arrow().unwrap().clone();
        assert_eq!(line.end(), Point::new(60.0, 40.0));
        assert_eq!(line.start(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_arrow_finalized_and_selected() {
        let (mut tm, mut canvas) = setup(ToolKind::Draw(LineStyle::DoubleArrow));
        let id = drag(&mut tm, &mut canvas, Point::new(10.0, 10.0), Point::new(200.0, 10.0))
            .unwrap();
        let a = canvas.annotation(id).unwrap();
        assert!(a.is_interactive());
        assert_eq!(a.shape.as_arrow().unwrap().heads(1.0).len(), 2);
        assert!(canvas.is_selected(id));
        // Drawing tools stay active by default.
        assert_eq!(tm.current_tool, ToolKind::Draw(LineStyle::DoubleArrow));
        assert!(!tm.is_active());
    }

    #[test]
    fn test_plain_line_not_selected() {
        let (mut tm, mut canvas) = setup(ToolKind::Draw(LineStyle::DashedLine));
        let id = drag(&mut tm, &mut canvas, Point::new(10.0, 10.0), Point::new(10.0, 90.0))
            .unwrap();
        assert!(!canvas.is_selected(id));
        let line = canvas.annotation(id).unwrap().shape.as_arrow().unwrap();
        assert_eq!(line.stroke_dash_array, Some(vec![10.0, 6.0]));
    }

    #[test]
    fn test_return_to_select_policy() {
        let config = EditorConfig {
            line_finish_policy: LineFinishPolicy::ReturnToSelect,
            ..EditorConfig::default()
        };
        let mut canvas = Canvas::new(Size::new(900.0, 600.0));
        let mut tm = ToolManager::new(&config);
        tm.set_tool(&mut canvas, ToolKind::Draw(LineStyle::WavyArrow));
        drag(&mut tm, &mut canvas, Point::new(10.0, 10.0), Point::new(300.0, 10.0)).unwrap();
        assert_eq!(tm.current_tool, ToolKind::Select);
    }

    #[test]
    fn test_click_without_drag_discarded() {
        let (mut tm, mut canvas) = setup(ToolKind::Draw(LineStyle::Arrow));
        let p = Point::new(50.0, 50.0);
        tm.pointer_down(&mut canvas, p, Modifiers::NONE);
        assert!(tm.pointer_up(&mut canvas, p).is_none());
        assert_eq!(canvas.document.annotation_count(), 0);
    }

    #[test]
    fn test_tool_switch_cancels_provisional() {
        let (mut tm, mut canvas) = setup(ToolKind::Draw(LineStyle::Arrow));
        tm.pointer_down(&mut canvas, Point::new(10.0, 10.0), Modifiers::NONE);
        tm.pointer_move(&mut canvas, Point::new(90.0, 10.0));
        tm.set_tool(&mut canvas, ToolKind::Select);
        assert_eq!(canvas.document.annotation_count(), 0);
        assert!(!tm.is_active());
    }

    #[test]
    fn test_brush_stroke() {
        let (mut tm, mut canvas) = setup(ToolKind::Brush);
        assert!(canvas.drawing_mode().is_some());
        tm.pointer_down(&mut canvas, Point::new(10.0, 10.0), Modifiers::NONE);
        tm.pointer_move(&mut canvas, Point::new(30.0, 25.0));
        let id = tm.pointer_up(&mut canvas, Point::new(50.0, 10.0)).unwrap();
        assert_eq!(canvas.annotation(id).unwrap().kind(), ShapeKind::Freehand);
        // Brush stays active.
        assert_eq!(tm.current_tool, ToolKind::Brush);
        tm.set_tool(&mut canvas, ToolKind::Select);
        assert!(canvas.drawing_mode().is_none());
    }

    #[test]
    fn test_place_returns_to_select() {
        let (mut tm, mut canvas) = setup(ToolKind::Brush);
        let id = tm.place(&mut canvas, factory::team_player(Team::Away, "b"));
        assert_eq!(tm.current_tool, ToolKind::Select);
        assert!(canvas.is_selected(id));
        assert!(canvas.drawing_mode().is_none());
    }

    #[test]
    fn test_select_drag_moves_selection() {
        let (mut tm, mut canvas) = setup(ToolKind::Select);
        let mut player = factory::team_player(Team::Home, "h");
        player.transform = Transform::at(Point::new(200.0, 200.0));
        let id = canvas.add(player);
        drag(&mut tm, &mut canvas, Point::new(200.0, 200.0), Point::new(250.0, 180.0));
        assert!(canvas.is_selected(id));
        assert_eq!(canvas.annotation(id).unwrap().transform.position(), Point::new(250.0, 180.0));
    }

    #[test]
    fn test_shift_click_builds_multi_selection() {
        let (mut tm, mut canvas) = setup(ToolKind::Select);
        let mut a = factory::ball();
        a.transform = Transform::at(Point::new(100.0, 100.0));
        let mut b = factory::ball();
        b.transform = Transform::at(Point::new(300.0, 100.0));
        let (a, b) = (canvas.add(a), canvas.add(b));

        tm.pointer_down(&mut canvas, Point::new(100.0, 100.0), Modifiers::NONE);
        tm.pointer_up(&mut canvas, Point::new(100.0, 100.0));
        tm.pointer_down(&mut canvas, Point::new(300.0, 100.0), Modifiers::SHIFT);
        tm.pointer_up(&mut canvas, Point::new(300.0, 100.0));
        assert_eq!(canvas.selected_ids(), vec![a, b]);

        // Clicking empty space clears it.
        tm.pointer_down(&mut canvas, Point::new(600.0, 500.0), Modifiers::NONE);
        tm.pointer_up(&mut canvas, Point::new(600.0, 500.0));
        assert!(canvas.active_selection().is_empty());
    }
}
