//! Pitchboard Core Library
//!
//! Platform-agnostic data structures and logic for the Pitchboard tactical
//! diagram editor.

pub mod canvas;
pub mod config;
pub mod editor;
pub mod input;
pub mod persistence;
pub mod pitch;
pub mod raster;
pub mod shapes;
pub mod storage;
pub mod tools;

pub use canvas::{ActiveSelection, BrushSettings, Canvas, CanvasDocument, SceneObject};
pub use config::{ConfigError, EditorConfig};
pub use editor::{DiagramEditor, SaveError, ToolAction};
pub use input::{InputState, Modifiers, MouseButton, PointerEvent};
pub use persistence::{DiagramDocument, PersistenceError, RestoreOutcome};
pub use pitch::{BackgroundMark, MarkGeometry, MarkKind, Orientation, PitchSpec, PitchType};
pub use raster::{RasterError, RasterResult, Rasterizer};
pub use shapes::{Annotation, SerializableColor, Shape, ShapeId, ShapeKind, Transform};
pub use storage::{DocumentStore, FileStorage, FileStore, MemoryStorage, StorageError};
pub use tools::{LineFinishPolicy, ToolKind, ToolManager, ToolState};
