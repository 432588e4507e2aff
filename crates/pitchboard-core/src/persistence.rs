//! Diagram documents: serialize the foreground, restore it with rescaling.

use crate::canvas::Canvas;
use crate::shapes::Annotation;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Key set by older editors on pitch marks that were saved by mistake.
const LEGACY_BACKGROUND_KEY: &str = "isBackground";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Persisted form of a diagram: annotations only, in draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub objects: Vec<Annotation>,
}

impl DiagramDocument {
    /// Capture the canvas foreground. Pitch marks are never included.
    pub fn from_canvas(canvas: &Canvas) -> Self {
        Self {
            objects: canvas.document.annotations().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn rescale(&mut self, from: Size, to: Size) {
        rescale_objects(&mut self.objects, from, to);
    }
}

/// Serialize the canvas foreground to JSON.
pub fn serialize(canvas: &Canvas) -> PersistenceResult<String> {
    DiagramDocument::from_canvas(canvas).to_json()
}

/// Scale annotations from one canvas size to another, per axis.
///
/// Degenerate sizes leave the objects untouched.
pub fn rescale_objects(objects: &mut [Annotation], from: Size, to: Size) {
    if from.width <= 0.0 || from.height <= 0.0 || from == to {
        return;
    }
    let sx = to.width / from.width;
    let sy = to.height / from.height;
    log::debug!("rescaling {} objects by ({sx}, {sy})", objects.len());
    for object in objects {
        object.rescale(sx, sy);
    }
}

/// Result of restoring a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The foreground was replaced with this many annotations.
    Restored(usize),
    /// Nothing to restore; the canvas is unchanged.
    Empty,
    /// The input could not be read; the canvas is unchanged.
    Malformed,
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored(_))
    }
}

fn is_legacy_background(entry: &Value) -> bool {
    entry
        .get(LEGACY_BACKGROUND_KEY)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Load stored annotations onto a canvas.
///
/// Legacy background entries are dropped and unreadable entries skipped.
/// When `previous_size` differs from the canvas size the annotations are
/// rescaled to fit. On success the existing foreground is replaced and
/// `after_load` runs so the caller can redraw the background.
pub fn restore(
    canvas: &mut Canvas,
    json: &str,
    previous_size: Option<Size>,
    after_load: impl FnOnce(&mut Canvas),
) -> RestoreOutcome {
    if json.trim().is_empty() {
        return RestoreOutcome::Empty;
    }
    let root: Value = match serde_json::from_str(json) {
        Ok(root) => root,
        Err(e) => {
            log::warn!("diagram is not valid JSON: {e}");
            return RestoreOutcome::Malformed;
        }
    };
    let Some(entries) = root.get("objects").and_then(Value::as_array) else {
        log::warn!("diagram has no objects array");
        return RestoreOutcome::Malformed;
    };

    let candidates: Vec<&Value> = entries.iter().filter(|e| !is_legacy_background(e)).collect();
    let stripped = entries.len() - candidates.len();
    if stripped > 0 {
        log::info!("dropped {stripped} legacy background entries");
    }
    if candidates.is_empty() {
        return RestoreOutcome::Empty;
    }

    let mut seen = HashSet::new();
    let mut objects = Vec::with_capacity(candidates.len());
    for entry in candidates.iter().copied() {
        match Annotation::deserialize(entry) {
            Ok(mut object) => {
                if !seen.insert(object.id) {
                    object.id = Uuid::new_v4();
                    seen.insert(object.id);
                }
                objects.push(object);
            }
            Err(e) => log::warn!("skipping unreadable diagram object: {e}"),
        }
    }
    if objects.is_empty() {
        log::warn!("no readable objects among {} entries", candidates.len());
        return RestoreOutcome::Malformed;
    }

    if let Some(previous) = previous_size {
        rescale_objects(&mut objects, previous, canvas.size());
    }

    canvas.clear();
    let count = objects.len();
    for object in objects {
        canvas.add(object);
    }
    after_load(canvas);
    log::info!("restored {count} diagram objects");
    RestoreOutcome::Restored(count)
}
