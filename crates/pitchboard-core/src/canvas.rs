//! Scene surface: pitch background marks and annotations in draw order.

use crate::pitch::{BackgroundMark, PitchSpec, compute_field_markings};
use crate::shapes::{Annotation, SerializableColor, ShapeId, ShapeKind, factory};
use kurbo::{Point, Size, Vec2};
use std::collections::HashMap;

/// Anything drawn on the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    Background(BackgroundMark),
    Annotation(Annotation),
}

impl SceneObject {
    pub fn id(&self) -> ShapeId {
        match self {
            SceneObject::Background(mark) => mark.id(),
            SceneObject::Annotation(a) => a.id(),
        }
    }

    pub fn is_background(&self) -> bool {
        matches!(self, SceneObject::Background(_))
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            SceneObject::Annotation(a) => Some(a),
            SceneObject::Background(_) => None,
        }
    }
}

/// Ordered set of scene objects, back to front.
#[derive(Debug, Clone, Default)]
pub struct CanvasDocument {
    objects: HashMap<ShapeId, SceneObject>,
    /// Z-order of objects (back to front).
    pub(crate) z_order: Vec<ShapeId>,
}

impl CanvasDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an annotation on top of everything else.
    pub fn add_annotation(&mut self, annotation: Annotation) -> ShapeId {
        let id = annotation.id();
        self.z_order.push(id);
        self.objects.insert(id, SceneObject::Annotation(annotation));
        id
    }

    /// Replace all background marks, keeping them below every annotation in
    /// the given order.
    pub fn set_background(&mut self, marks: Vec<BackgroundMark>) {
        let old: Vec<ShapeId> = self.background_marks().map(|m| m.id()).collect();
        for id in old {
            self.remove(id);
        }
        let ids: Vec<ShapeId> = marks.iter().map(|m| m.id()).collect();
        for mark in marks {
            self.objects.insert(mark.id(), SceneObject::Background(mark));
        }
        self.z_order.splice(0..0, ids);
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<SceneObject> {
        self.z_order.retain(|&other| other != id);
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn annotation(&self, id: ShapeId) -> Option<&Annotation> {
        self.objects.get(&id).and_then(SceneObject::as_annotation)
    }

    pub fn annotation_mut(&mut self, id: ShapeId) -> Option<&mut Annotation> {
        match self.objects.get_mut(&id) {
            Some(SceneObject::Annotation(a)) => Some(a),
            _ => None,
        }
    }

    pub fn is_background(&self, id: ShapeId) -> bool {
        self.objects.get(&id).is_some_and(SceneObject::is_background)
    }

    /// All objects in draw order.
    pub fn objects_ordered(&self) -> impl Iterator<Item = &SceneObject> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Annotations in draw order.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.objects_ordered().filter_map(SceneObject::as_annotation)
    }

    pub fn annotations_mut(&mut self) -> impl Iterator<Item = &mut Annotation> {
        self.objects.values_mut().filter_map(|obj| match obj {
            SceneObject::Annotation(a) => Some(a),
            SceneObject::Background(_) => None,
        })
    }

    /// Background marks in draw order.
    pub fn background_marks(&self) -> impl Iterator<Item = &BackgroundMark> {
        self.objects_ordered().filter_map(|obj| match obj {
            SceneObject::Background(mark) => Some(mark),
            SceneObject::Annotation(_) => None,
        })
    }

    /// Interactive annotations under a point, front to back.
    pub fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.annotation(id)
                    .filter(|a| a.is_interactive() && a.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// Most recently drawn annotation.
    pub fn last_annotation(&self) -> Option<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|&id| self.annotation(id).is_some())
    }

    /// Drop every annotation, returning how many were removed.
    pub fn clear_annotations(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|_, obj| obj.is_background());
        let objects = &self.objects;
        self.z_order.retain(|id| objects.contains_key(id));
        before - self.objects.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.objects.values().filter(|o| !o.is_background()).count()
    }

    pub fn background_count(&self) -> usize {
        self.objects.values().filter(|o| o.is_background()).count()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Current selection on the surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActiveSelection {
    #[default]
    None,
    Single(ShapeId),
    Multi(Vec<ShapeId>),
}

impl ActiveSelection {
    /// Selected ids, with a multi-selection expanded into its members.
    pub fn ids(&self) -> Vec<ShapeId> {
        match self {
            ActiveSelection::None => Vec::new(),
            ActiveSelection::Single(id) => vec![*id],
            ActiveSelection::Multi(ids) => ids.clone(),
        }
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        match self {
            ActiveSelection::None => false,
            ActiveSelection::Single(other) => *other == id,
            ActiveSelection::Multi(ids) => ids.contains(&id),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ActiveSelection::None
    }

    fn from_ids(mut ids: Vec<ShapeId>) -> Self {
        match ids.len() {
            0 => ActiveSelection::None,
            1 => ActiveSelection::Single(ids.remove(0)),
            _ => ActiveSelection::Multi(ids),
        }
    }
}

/// Brush colour and width while free drawing is on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub color: SerializableColor,
    pub width: f64,
}

/// Runtime editing surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub document: CanvasDocument,
    size: Size,
    selection: ActiveSelection,
    /// Free drawing is on when set.
    drawing: Option<BrushSettings>,
    stroke_points: Vec<Point>,
    /// Text label currently in edit mode.
    editing: Option<ShapeId>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            document: CanvasDocument::new(),
            size,
            selection: ActiveSelection::None,
            drawing: None,
            stroke_points: Vec::new(),
            editing: None,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize the surface. Existing geometry is not touched.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Recompute and install pitch marks for the current surface size.
    pub fn draw_background(&mut self, spec: PitchSpec) {
        let marks = compute_field_markings(
            spec.pitch_type,
            spec.orientation,
            self.size.width,
            self.size.height,
        );
        log::debug!("drawing {} pitch marks for {spec}", marks.len());
        self.document.set_background(marks);
    }

    pub fn add(&mut self, annotation: Annotation) -> ShapeId {
        self.document.add_annotation(annotation)
    }

    /// Add an annotation and make it the active selection.
    pub fn add_and_select(&mut self, annotation: Annotation) -> ShapeId {
        let id = self.add(annotation);
        self.select(id);
        id
    }

    /// Remove one annotation. Background marks are left alone.
    pub fn remove(&mut self, id: ShapeId) -> Option<Annotation> {
        if self.document.is_background(id) {
            return None;
        }
        self.forget(id);
        match self.document.remove(id) {
            Some(SceneObject::Annotation(a)) => Some(a),
            _ => None,
        }
    }

    fn forget(&mut self, id: ShapeId) {
        if self.selection.contains(id) {
            let ids = self.selection.ids().into_iter().filter(|&o| o != id).collect();
            self.selection = ActiveSelection::from_ids(ids);
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
    }

    pub fn annotation(&self, id: ShapeId) -> Option<&Annotation> {
        self.document.annotation(id)
    }

    pub fn annotation_mut(&mut self, id: ShapeId) -> Option<&mut Annotation> {
        self.document.annotation_mut(id)
    }

    /// Topmost interactive annotation under a point.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.document.shapes_at_point(point, tolerance).first().copied()
    }

    // --- selection ---

    pub fn active_selection(&self) -> &ActiveSelection {
        &self.selection
    }

    pub fn selected_ids(&self) -> Vec<ShapeId> {
        self.selection.ids()
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selection.contains(id)
    }

    /// Select a single annotation. Returns false for unknown ids and background marks.
    pub fn select(&mut self, id: ShapeId) -> bool {
        if self.document.annotation(id).is_none() {
            return false;
        }
        self.selection = ActiveSelection::Single(id);
        true
    }

    pub fn add_to_selection(&mut self, id: ShapeId) -> bool {
        if self.document.annotation(id).is_none() {
            return false;
        }
        if !self.selection.contains(id) {
            let mut ids = self.selection.ids();
            ids.push(id);
            self.selection = ActiveSelection::from_ids(ids);
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = ActiveSelection::None;
    }

    /// Delete the active selection. Returns the number of annotations removed.
    pub fn remove_selected(&mut self) -> usize {
        let ids = self.selection.ids();
        self.clear_selection();
        ids.into_iter()
            .filter(|&id| self.remove(id).is_some())
            .count()
    }

    /// Move every selected annotation by a delta.
    pub fn translate_selected(&mut self, delta: Vec2) {
        for id in self.selection.ids() {
            if let Some(a) = self.document.annotation_mut(id) {
                a.translate(delta);
            }
        }
    }

    /// Apply a body colour to selected players, markers and cones.
    /// Returns how many annotations changed.
    pub fn recolor_selected(&mut self, color: SerializableColor) -> usize {
        self.selection
            .ids()
            .into_iter()
            .filter(|&id| {
                self.document
                    .annotation_mut(id)
                    .is_some_and(|a| a.set_body_color(color))
            })
            .count()
    }

    // --- history ---

    /// Remove the most recently drawn annotation.
    pub fn undo_last(&mut self) -> Option<Annotation> {
        let id = self.document.last_annotation()?;
        self.remove(id)
    }

    /// Remove all annotations, keeping the pitch.
    pub fn clear(&mut self) -> usize {
        self.clear_selection();
        self.editing = None;
        self.stroke_points.clear();
        self.document.clear_annotations()
    }

    /// Toggle pointer interaction for every annotation.
    pub fn set_interactive_all(&mut self, interactive: bool) {
        for a in self.document.annotations_mut() {
            a.interactive = interactive;
        }
    }

    pub fn set_interactive(&mut self, id: ShapeId, interactive: bool) {
        if let Some(a) = self.document.annotation_mut(id) {
            a.interactive = interactive;
        }
    }

    // --- free drawing ---

    pub fn set_drawing_mode(&mut self, brush: Option<BrushSettings>) {
        self.drawing = brush;
        self.stroke_points.clear();
    }

    pub fn drawing_mode(&self) -> Option<BrushSettings> {
        self.drawing
    }

    /// Start capturing a stroke. Ignored unless free drawing is on.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        if self.drawing.is_none() {
            return false;
        }
        self.stroke_points.clear();
        self.stroke_points.push(point);
        true
    }

    pub fn extend_stroke(&mut self, point: Point) {
        if self.drawing.is_some() && !self.stroke_points.is_empty() {
            self.stroke_points.push(point);
        }
    }

    /// Drop the stroke in progress without adding it.
    pub fn discard_stroke(&mut self) {
        self.stroke_points.clear();
    }

    /// Points captured so far for the stroke in progress.
    pub fn stroke_in_progress(&self) -> &[Point] {
        &self.stroke_points
    }

    /// Finish the stroke and add it as a freehand annotation.
    pub fn end_stroke(&mut self) -> Option<ShapeId> {
        let brush = self.drawing?;
        if self.stroke_points.is_empty() {
            return None;
        }
        let points = std::mem::take(&mut self.stroke_points);
        Some(self.add(factory::freehand(&points, brush.color, brush.width)))
    }

    // --- text editing ---

    /// Put a text label into edit mode. Other kinds are refused.
    pub fn enter_text_editing(&mut self, id: ShapeId) -> bool {
        let is_text = self
            .document
            .annotation(id)
            .is_some_and(|a| a.kind() == ShapeKind::Text);
        if is_text {
            self.editing = Some(id);
        }
        is_text
    }

    pub fn exit_text_editing(&mut self) {
        self.editing = None;
    }

    pub fn editing_shape(&self) -> Option<ShapeId> {
        self.editing
    }

    /// Replace the text of the label being edited.
    pub fn set_editing_text(&mut self, text: &str) -> bool {
        let Some(id) = self.editing else {
            return false;
        };
        match self
            .document
            .annotation_mut(id)
            .and_then(|a| a.shape.as_text_mut())
        {
            Some(label) => {
                label.text = text.to_string();
                true
            }
            None => false,
        }
    }
}
