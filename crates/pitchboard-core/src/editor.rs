//! Editor instance: owns the canvas, the tool state machine and the save flow.

use crate::canvas::Canvas;
use crate::config::EditorConfig;
use crate::input::{InputState, MouseButton, PointerEvent};
use crate::persistence::{self, PersistenceError, RestoreOutcome};
use crate::pitch::PitchSpec;
use crate::raster::{RasterError, Rasterizer};
use crate::shapes::{SerializableColor, ShapeId, ShapeKind, Team, factory};
use crate::storage::{DocumentStore, FileStore, StorageError};
use crate::tools::{ToolKind, ToolManager};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Toolbar actions.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    SetTool(ToolKind),
    AddPlayer { team: Team, label: String },
    AddBall,
    AddCone,
    AddMarker,
    AddText,
    RemoveSelected,
    Undo,
    Clear,
    /// Recolour the body of selected players, markers and cones.
    SetColor(SerializableColor),
    /// Replace the text of the label being edited.
    EditText(String),
    FinishTextEditing,
}

/// Which step of a save failed.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to serialize diagram: {0}")]
    Serialize(#[from] PersistenceError),
    #[error("Failed to save document: {0}")]
    Document(#[source] StorageError),
    #[error("Failed to render preview: {0}")]
    Raster(#[from] RasterError),
    #[error("Failed to upload preview image: {0}")]
    Image(#[source] StorageError),
    #[error("Failed to record preview reference: {0}")]
    PreviewReference(#[source] StorageError),
}

pub type SaveResult<T> = Result<T, SaveError>;

/// Name of the preview image for a document.
pub fn preview_file_name(document_id: &str) -> String {
    format!("diagram-{document_id}.png")
}

/// One editable diagram bound to a document.
pub struct DiagramEditor {
    document_id: String,
    canvas: Canvas,
    tools: ToolManager,
    input: InputState,
    pitch: PitchSpec,
    config: EditorConfig,
    preview_url: Option<String>,
}

impl DiagramEditor {
    /// Fresh editor with the pitch drawn and no annotations.
    pub fn new(document_id: impl Into<String>, pitch: PitchSpec, config: EditorConfig) -> Self {
        let mut canvas = Canvas::new(pitch.dimensions());
        canvas.draw_background(pitch);
        Self {
            document_id: document_id.into(),
            canvas,
            tools: ToolManager::new(&config),
            input: InputState::new(),
            pitch,
            config,
            preview_url: None,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn pitch(&self) -> PitchSpec {
        self.pitch
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Reference to the last uploaded preview image.
    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    /// Replace the foreground with a stored diagram. An empty or unreadable
    /// document leaves the bare pitch.
    pub fn open(&mut self, json: &str) -> RestoreOutcome {
        self.tools.cancel(&mut self.canvas);
        let pitch = self.pitch;
        let outcome = persistence::restore(&mut self.canvas, json, None, |canvas| {
            canvas.draw_background(pitch)
        });
        if !outcome.is_restored() {
            self.reset_canvas();
        }
        outcome
    }

    fn reset_canvas(&mut self) {
        let removed = self.canvas.clear();
        self.canvas.draw_background(self.pitch);
        log::debug!("reset canvas to bare pitch, dropped {removed} shapes");
    }

    /// Load the stored diagram and preview reference for this document.
    pub async fn load(
        &mut self,
        store: &dyn DocumentStore,
    ) -> Result<RestoreOutcome, StorageError> {
        let json = store.load_document(&self.document_id).await?;
        self.preview_url = store.load_preview_reference(&self.document_id).await?;
        Ok(match json {
            Some(json) => self.open(&json),
            None => {
                self.tools.cancel(&mut self.canvas);
                self.reset_canvas();
                RestoreOutcome::Empty
            }
        })
    }

    /// Switch pitch layout. The canvas is rebuilt at the new size and the
    /// existing annotations are carried over, rescaled per axis.
    pub fn set_pitch(&mut self, pitch: PitchSpec) -> RestoreOutcome {
        self.tools.cancel(&mut self.canvas);
        let json = match persistence::serialize(&self.canvas) {
            Ok(json) => json,
            Err(e) => {
                log::error!("cannot capture diagram before pitch change: {e}");
                String::new()
            }
        };
        let previous = self.canvas.size();

        let mut canvas = Canvas::new(pitch.dimensions());
        canvas.draw_background(pitch);
        let outcome = persistence::restore(&mut canvas, &json, Some(previous), |c| {
            c.draw_background(pitch)
        });
        log::info!("pitch {} -> {pitch}: {outcome:?}", self.pitch);

        self.canvas = canvas;
        self.pitch = pitch;
        let tool = self.tools.current_tool;
        self.tools.set_tool(&mut self.canvas, tool);
        outcome
    }

    /// Run a toolbar action. Returns the id of a newly placed shape.
    pub fn apply(&mut self, action: ToolAction) -> Option<ShapeId> {
        let canvas = &mut self.canvas;
        match action {
            ToolAction::SetTool(tool) => {
                self.tools.set_tool(canvas, tool);
                None
            }
            ToolAction::AddPlayer { team, label } => {
                Some(self.tools.place(canvas, factory::team_player(team, &label)))
            }
            ToolAction::AddBall => Some(self.tools.place(canvas, factory::ball())),
            ToolAction::AddCone => Some(self.tools.place(
                canvas,
                factory::cone(SerializableColor::hex(factory::CONE_FILL)),
            )),
            ToolAction::AddMarker => Some(self.tools.place(
                canvas,
                factory::marker(SerializableColor::hex(factory::MARKER_FILL)),
            )),
            ToolAction::AddText => {
                let label = factory::text(&self.config.default_text, SerializableColor::white());
                let id = self.tools.place(canvas, label);
                canvas.enter_text_editing(id);
                Some(id)
            }
            ToolAction::RemoveSelected => {
                let removed = canvas.remove_selected();
                log::debug!("removed {removed} selected shapes");
                None
            }
            ToolAction::Undo => {
                // A shape still being drawn is the thing to undo.
                if self.tools.provisional().is_some() {
                    self.tools.cancel(canvas);
                } else {
                    canvas.undo_last();
                }
                None
            }
            ToolAction::Clear => {
                self.tools.cancel(canvas);
                let removed = canvas.clear();
                log::debug!("cleared {removed} shapes");
                None
            }
            ToolAction::SetColor(color) => {
                canvas.recolor_selected(color);
                None
            }
            ToolAction::EditText(text) => {
                canvas.set_editing_text(&text);
                None
            }
            ToolAction::FinishTextEditing => {
                canvas.exit_text_editing();
                None
            }
        }
    }

    /// Route pointer input to the tool state machine. Returns the id of a
    /// shape created by the gesture.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<ShapeId> {
        self.input.handle_pointer_event(event);
        let canvas = &mut self.canvas;
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
                modifiers,
            } => {
                if self.tools.current_tool == ToolKind::Select {
                    let hit = canvas.hit_test(position, self.config.hit_tolerance);
                    if canvas.editing_shape().is_some() && canvas.editing_shape() != hit {
                        canvas.exit_text_editing();
                    }
                    if self.input.is_double_click() {
                        if let Some(id) = hit.filter(|&id| {
                            canvas.annotation(id).map(|a| a.kind()) == Some(ShapeKind::Text)
                        }) {
                            canvas.enter_text_editing(id);
                        }
                    }
                }
                self.tools.pointer_down(canvas, position, modifiers);
                None
            }
            PointerEvent::Move { position } => {
                self.tools.pointer_move(canvas, position);
                None
            }
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
            } => self.tools.pointer_up(canvas, position),
            PointerEvent::Down { .. } | PointerEvent::Up { .. } => None,
        }
    }

    /// Persist the diagram: document JSON, then the rendered preview, then
    /// the preview reference. Steps run strictly in order and the first
    /// failure stops the flow; the canvas is never modified by a save.
    pub async fn save(
        &mut self,
        documents: &dyn DocumentStore,
        files: &dyn FileStore,
        rasterizer: &dyn Rasterizer,
    ) -> SaveResult<String> {
        self.tools.cancel(&mut self.canvas);
        match self.run_save(documents, files, rasterizer).await {
            Ok(url) => {
                log::info!("saved diagram {} with preview {url}", self.document_id);
                self.preview_url = Some(url.clone());
                Ok(url)
            }
            Err(e) => {
                log::error!("saving diagram {} failed: {e}", self.document_id);
                Err(e)
            }
        }
    }

    async fn run_save(
        &self,
        documents: &dyn DocumentStore,
        files: &dyn FileStore,
        rasterizer: &dyn Rasterizer,
    ) -> SaveResult<String> {
        let id = self.document_id.as_str();
        let json = persistence::serialize(&self.canvas)?;
        documents
            .save_document(id, &json)
            .await
            .map_err(SaveError::Document)?;
        log::info!("saved diagram document {id} ({} bytes)", json.len());

        let png = rasterizer.render_png(&self.canvas, self.config.raster_pixel_ratio)?;
        let encoded = STANDARD.encode(&png);
        let stored = files
            .save_image_file(&preview_file_name(id), &encoded, id)
            .await
            .map_err(SaveError::Image)?;
        log::info!("uploaded preview for {id} to {}", stored.file_url);

        documents
            .save_preview_reference(id, &stored.file_url)
            .await
            .map_err(SaveError::PreviewReference)?;
        Ok(stored.file_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::pitch::{Orientation, PitchType};
    use crate::raster::RasterResult;
    use crate::shapes::{LineStyle, Shape};
    use crate::storage::{BoxFuture, MemoryStorage, StorageResult, StoredFile};
    use kurbo::Point;
    use pollster::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn full() -> PitchSpec {
        PitchSpec::new(PitchType::Full, Orientation::Horizontal)
    }

    fn editor() -> DiagramEditor {
        DiagramEditor::new("drill-7", full(), EditorConfig::default())
    }

    struct FixedRaster;

    impl Rasterizer for FixedRaster {
        fn render_png(&self, canvas: &Canvas, pixel_ratio: f64) -> RasterResult<Vec<u8>> {
            crate::raster::raster_size(canvas, pixel_ratio)?;
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    /// Fails the first `failures` uploads, then delegates.
    struct FlakyFiles {
        inner: MemoryStorage,
        failures: AtomicUsize,
    }

    impl FileStore for FlakyFiles {
        fn save_image_file(
            &self,
            file_name: &str,
            base64_png: &str,
            owner_id: &str,
        ) -> BoxFuture<'_, StorageResult<StoredFile>> {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Box::pin(async {
                    Err::<StoredFile, _>(StorageError::Io("upload refused".to_string()))
                });
            }
            self.inner.save_image_file(file_name, base64_png, owner_id)
        }
    }

    /// Fails the first `document_failures` document writes and the first
    /// `reference_failures` preview reference writes.
    #[derive(Default)]
    struct FlakyDocuments {
        inner: MemoryStorage,
        document_failures: AtomicUsize,
        reference_failures: AtomicUsize,
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn refused<'a>(what: &str) -> BoxFuture<'a, StorageResult<()>> {
        let message = format!("{what} refused");
        Box::pin(async move { Err::<(), _>(StorageError::Io(message)) })
    }

    impl DocumentStore for FlakyDocuments {
        fn save_document(&self, id: &str, json: &str) -> BoxFuture<'_, StorageResult<()>> {
            if take_failure(&self.document_failures) {
                return refused("document write");
            }
            self.inner.save_document(id, json)
        }

        fn load_document(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
            self.inner.load_document(id)
        }

        fn save_preview_reference(
            &self,
            id: &str,
            file_url: &str,
        ) -> BoxFuture<'_, StorageResult<()>> {
            if take_failure(&self.reference_failures) {
                return refused("reference write");
            }
            self.inner.save_preview_reference(id, file_url)
        }

        fn load_preview_reference(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
            self.inner.load_preview_reference(id)
        }

        fn list_documents(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
            self.inner.list_documents()
        }

        fn delete_document(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
            self.inner.delete_document(id)
        }
    }

    fn drag(editor: &mut DiagramEditor, from: Point, to: Point) -> Option<ShapeId> {
        editor.handle_pointer(PointerEvent::press(from));
        editor.handle_pointer(PointerEvent::Move { position: to });
        editor.handle_pointer(PointerEvent::release(to))
    }

    #[test]
    fn test_new_editor_has_pitch_only() {
        let e = editor();
        assert_eq!(e.canvas().size(), full().dimensions());
        assert!(e.canvas().document.background_count() > 0);
        assert_eq!(e.canvas().document.annotation_count(), 0);
    }

    #[test]
    fn test_placement_actions() {
        let mut e = editor();
        e.apply(ToolAction::SetTool(ToolKind::Draw(LineStyle::Arrow)));
        let id = e
            .apply(ToolAction::AddPlayer {
                team: Team::Away,
                label: " lw ".to_string(),
            })
            .unwrap();
        assert_eq!(e.current_tool(), ToolKind::Select);
        assert!(e.canvas().is_selected(id));
        let player = e.canvas().annotation(id).unwrap();
        assert_eq!(player.transform.position(), factory::PLAYER_SPOT);
        match &player.shape {
            Shape::Player(p) => assert_eq!(p.label, "LW"),
            other => panic!("unexpected {other:?}"),
        }

        let cone = e.apply(ToolAction::AddCone).unwrap();
        assert_eq!(e.canvas().annotation(cone).unwrap().transform.position(), factory::CONE_SPOT);
        assert!(e.apply(ToolAction::AddBall).is_some());
        assert!(e.apply(ToolAction::AddMarker).is_some());
        assert_eq!(e.canvas().document.annotation_count(), 4);
    }

    #[test]
    fn test_add_text_starts_editing() {
        let mut e = editor();
        let id = e.apply(ToolAction::AddText).unwrap();
        assert_eq!(e.canvas().editing_shape(), Some(id));
        e.apply(ToolAction::EditText("Overload".to_string()));
        e.apply(ToolAction::FinishTextEditing);
        assert_eq!(e.canvas().editing_shape(), None);
        match &e.canvas().annotation(id).unwrap().shape {
            Shape::Text(t) => assert_eq!(t.text, "Overload"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_double_click_edits_text() {
        let mut e = editor();
        let id = e.apply(ToolAction::AddText).unwrap();
        e.apply(ToolAction::FinishTextEditing);
        let inside = factory::TEXT_SPOT + kurbo::Vec2::new(5.0, 5.0);
        for _ in 0..2 {
            e.handle_pointer(PointerEvent::press(inside));
            e.handle_pointer(PointerEvent::release(inside));
        }
        assert_eq!(e.canvas().editing_shape(), Some(id));

        // Clicking elsewhere ends editing.
        e.handle_pointer(PointerEvent::press(Point::new(700.0, 500.0)));
        assert_eq!(e.canvas().editing_shape(), None);
    }

    #[test]
    fn test_draw_then_undo_and_clear() {
        let mut e = editor();
        let marks = e.canvas().document.background_count();
        e.apply(ToolAction::SetTool(ToolKind::Draw(LineStyle::WavyArrow)));
        let first = drag(&mut e, Point::new(100.0, 100.0), Point::new(400.0, 100.0)).unwrap();
        let second = drag(&mut e, Point::new(100.0, 300.0), Point::new(400.0, 300.0)).unwrap();
        assert_ne!(first, second);

        e.apply(ToolAction::Undo);
        assert!(e.canvas().annotation(second).is_none());
        assert!(e.canvas().annotation(first).is_some());

        e.apply(ToolAction::AddBall);
        e.apply(ToolAction::Clear);
        assert_eq!(e.canvas().document.annotation_count(), 0);
        assert_eq!(e.canvas().document.background_count(), marks);
    }

    #[test]
    fn test_undo_while_drawing_drops_provisional_only() {
        let mut e = editor();
        e.apply(ToolAction::AddCone);
        e.apply(ToolAction::SetTool(ToolKind::Draw(LineStyle::Line)));
        e.handle_pointer(PointerEvent::press(Point::new(10.0, 10.0)));
        e.handle_pointer(PointerEvent::Move {
            position: Point::new(90.0, 10.0),
        });
        e.apply(ToolAction::Undo);
        assert_eq!(e.canvas().document.annotation_count(), 1);
    }

    #[test]
    fn test_remove_and_recolor() {
        let mut e = editor();
        let marker = e.apply(ToolAction::AddMarker).unwrap();
        let green = SerializableColor::hex("#16a34a");
        e.apply(ToolAction::SetColor(green));
        match &e.canvas().annotation(marker).unwrap().shape {
            Shape::Marker(m) => assert_eq!(m.fill, green),
            other => panic!("unexpected {other:?}"),
        }
        e.apply(ToolAction::RemoveSelected);
        assert_eq!(e.canvas().document.annotation_count(), 0);
    }

    #[test]
    fn test_set_pitch_rescales_foreground() {
        let mut e = editor();
        let id = e
            .apply(ToolAction::AddPlayer {
                team: Team::Home,
                label: "9".to_string(),
            })
            .unwrap();
        let vertical = PitchSpec::new(PitchType::Full, Orientation::Vertical);
        let outcome = e.set_pitch(vertical);
        assert_eq!(outcome, RestoreOutcome::Restored(1));
        assert_eq!(e.canvas().size(), vertical.dimensions());

        let t = e.canvas().annotation(id).unwrap().transform;
        assert!((t.left - 80.0 * 600.0 / 900.0).abs() < 1e-9);
        assert!((t.top - 80.0 * 900.0 / 600.0).abs() < 1e-9);
        assert!(e.canvas().document.background_count() > 0);
    }

    #[test]
    fn test_set_pitch_empty_regenerates_background() {
        let mut e = editor();
        let full_marks = e.canvas().document.background_count();
        let outcome = e.set_pitch(PitchSpec::new(PitchType::Third, Orientation::Horizontal));
        assert_eq!(outcome, RestoreOutcome::Empty);
        let third_marks = e.canvas().document.background_count();
        assert!(third_marks > 0 && third_marks < full_marks);
    }

    #[test]
    fn test_set_pitch_cancels_provisional_and_keeps_brush() {
        let mut e = editor();
        e.apply(ToolAction::SetTool(ToolKind::Draw(LineStyle::Arrow)));
        e.handle_pointer(PointerEvent::press(Point::new(10.0, 10.0)));
        e.handle_pointer(PointerEvent::Move {
            position: Point::new(90.0, 10.0),
        });
        e.set_pitch(PitchSpec::new(PitchType::Half, Orientation::Horizontal));
        assert_eq!(e.canvas().document.annotation_count(), 0);

        e.apply(ToolAction::SetTool(ToolKind::Brush));
        e.set_pitch(full());
        assert!(e.canvas().drawing_mode().is_some());
    }

    #[test]
    fn test_shift_click_then_drag_moves_both() {
        let mut e = editor();
        let player = e
            .apply(ToolAction::AddPlayer {
                team: Team::Home,
                label: "1".to_string(),
            })
            .unwrap();
        let cone = e.apply(ToolAction::AddCone).unwrap();
        e.handle_pointer(PointerEvent::Down {
            position: factory::PLAYER_SPOT,
            button: MouseButton::Left,
            modifiers: Modifiers::SHIFT,
        });
        e.handle_pointer(PointerEvent::release(factory::PLAYER_SPOT));
        assert_eq!(e.canvas().selected_ids(), vec![cone, player]);

        drag(&mut e, factory::CONE_SPOT, factory::CONE_SPOT + kurbo::Vec2::new(10.0, 0.0));
        let moved = e.canvas().annotation(player).unwrap().transform.position();
        assert_eq!(moved, factory::PLAYER_SPOT + kurbo::Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_save_writes_all_three_steps() {
        let mut e = editor();
        e.apply(ToolAction::AddBall);
        let store = MemoryStorage::new();
        let url = block_on(e.save(&store, &store, &FixedRaster)).unwrap();

        assert_eq!(url, "/files/diagram-drill-7.png");
        assert_eq!(e.preview_url(), Some(url.as_str()));
        let json = block_on(store.load_document("drill-7")).unwrap().unwrap();
        assert!(json.contains("\"ball\""));
        assert_eq!(store.file("diagram-drill-7.png"), Some(vec![0x89, b'P', b'N', b'G']));
        assert_eq!(
            block_on(store.load_preview_reference("drill-7")).unwrap(),
            Some(url)
        );
    }

    #[test]
    fn test_failed_upload_keeps_state_and_retry_succeeds() {
        let mut e = editor();
        e.apply(ToolAction::AddCone);
        let before = persistence::serialize(e.canvas()).unwrap();
        let documents = MemoryStorage::new();
        let files = FlakyFiles {
            inner: MemoryStorage::new(),
            failures: AtomicUsize::new(1),
        };

        let err = block_on(e.save(&documents, &files, &FixedRaster)).unwrap_err();
        assert!(matches!(err, SaveError::Image(_)));
        assert_eq!(persistence::serialize(e.canvas()).unwrap(), before);
        assert_eq!(e.preview_url(), None);
        assert!(block_on(documents.load_document("drill-7")).unwrap().is_some());
        assert_eq!(block_on(documents.load_preview_reference("drill-7")).unwrap(), None);

        let url = block_on(e.save(&documents, &files, &FixedRaster)).unwrap();
        assert_eq!(
            block_on(documents.load_preview_reference("drill-7")).unwrap(),
            Some(url)
        );
    }

    #[test]
    fn test_failed_document_write_stops_before_upload() {
        let mut e = editor();
        e.apply(ToolAction::AddPlayer {
            team: Team::Home,
            label: "6".to_string(),
        });
        let before = persistence::serialize(e.canvas()).unwrap();
        let documents = FlakyDocuments {
            document_failures: AtomicUsize::new(1),
            ..Default::default()
        };
        let files = MemoryStorage::new();

        let err = block_on(e.save(&documents, &files, &FixedRaster)).unwrap_err();
        assert!(matches!(err, SaveError::Document(_)));
        assert_eq!(persistence::serialize(e.canvas()).unwrap(), before);
        assert_eq!(e.preview_url(), None);
        assert_eq!(block_on(documents.load_document("drill-7")).unwrap(), None);
        assert_eq!(files.file("diagram-drill-7.png"), None);
        assert_eq!(block_on(documents.load_preview_reference("drill-7")).unwrap(), None);

        let url = block_on(e.save(&documents, &files, &FixedRaster)).unwrap();
        assert_eq!(block_on(documents.load_document("drill-7")).unwrap(), Some(before));
        assert!(files.file("diagram-drill-7.png").is_some());
        assert_eq!(
            block_on(documents.load_preview_reference("drill-7")).unwrap(),
            Some(url)
        );
    }

    #[test]
    fn test_failed_reference_write_keeps_state_and_retry_succeeds() {
        let mut e = editor();
        e.apply(ToolAction::AddBall);
        let before = persistence::serialize(e.canvas()).unwrap();
        let documents = FlakyDocuments {
            reference_failures: AtomicUsize::new(1),
            ..Default::default()
        };
        let files = MemoryStorage::new();

        let err = block_on(e.save(&documents, &files, &FixedRaster)).unwrap_err();
        assert!(matches!(err, SaveError::PreviewReference(_)));
        assert_eq!(persistence::serialize(e.canvas()).unwrap(), before);
        assert_eq!(e.preview_url(), None);
        assert_eq!(block_on(documents.load_preview_reference("drill-7")).unwrap(), None);

        let url = block_on(e.save(&documents, &files, &FixedRaster)).unwrap();
        assert_eq!(e.preview_url(), Some(url.as_str()));
        assert_eq!(
            block_on(documents.load_preview_reference("drill-7")).unwrap(),
            Some(url)
        );
    }

    #[test]
    fn test_open_unreadable_or_empty_leaves_bare_pitch() {
        for json in ["{not json", r#"{"objects":[]}"#] {
            let mut e = editor();
            let marks = e.canvas().document.background_count();
            e.apply(ToolAction::AddCone);
            let outcome = e.open(json);
            assert!(!outcome.is_restored());
            assert_eq!(e.canvas().document.annotation_count(), 0);
            assert_eq!(e.canvas().document.background_count(), marks);
            assert!(e.canvas().selected_ids().is_empty());
        }
    }

    #[test]
    fn test_load_missing_document_clears_canvas() {
        let store = MemoryStorage::new();
        let mut e = editor();
        e.apply(ToolAction::AddMarker);
        assert_eq!(block_on(e.load(&store)).unwrap(), RestoreOutcome::Empty);
        assert_eq!(e.canvas().document.annotation_count(), 0);
        assert!(e.canvas().document.background_count() > 0);
    }

    #[test]
    fn test_load_restores_from_store() {
        let store = MemoryStorage::new();
        let mut first = editor();
        first.apply(ToolAction::AddMarker);
        block_on(first.save(&store, &store, &FixedRaster)).unwrap();

        let mut second = editor();
        let outcome = block_on(second.load(&store)).unwrap();
        assert_eq!(outcome, RestoreOutcome::Restored(1));
        assert_eq!(second.preview_url(), first.preview_url());

        let mut blank = DiagramEditor::new("other", full(), EditorConfig::default());
        assert_eq!(block_on(blank.load(&store)).unwrap(), RestoreOutcome::Empty);
    }
}
