//! Pitchboard Application
//!
//! Headless shell around the diagram editor: render stored diagrams, move
//! them between pitch layouts and run the save flow against a directory.

use pitchboard_core::config::{ConfigError, EditorConfig};
use pitchboard_core::editor::{DiagramEditor, SaveError};
use pitchboard_core::persistence::{self, PersistenceError, RestoreOutcome};
use pitchboard_core::pitch::{Orientation, PitchSpec, PitchType};
use pitchboard_core::raster::{RasterError, Rasterizer};
use pitchboard_core::storage::{DocumentStore, FileStorage, StorageError};
use pitchboard_render::SkiaRenderer;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by the command-line shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Nothing to {action}: {path} holds no readable diagram")]
    NoDiagram { action: &'static str, path: PathBuf },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

pub type AppResult<T> = Result<T, AppError>;

/// Parse `<type>[:<orientation>]`, e.g. `full`, `half:vertical`.
pub fn parse_pitch(value: &str) -> Result<PitchSpec, String> {
    let (kind, orientation) = value.split_once(':').unwrap_or((value, "horizontal"));
    let pitch_type = match kind.trim().to_ascii_lowercase().as_str() {
        "full" | "half" | "third" | "custom" => PitchType::from_name(kind),
        other => return Err(format!("unknown pitch type `{other}`")),
    };
    let orientation = match orientation.trim().to_ascii_lowercase().as_str() {
        "horizontal" | "vertical" => Orientation::from_name(orientation),
        other => return Err(format!("unknown orientation `{other}`")),
    };
    Ok(PitchSpec::new(pitch_type, orientation))
}

/// Explicit path, or `<config dir>/pitchboard/config.json`.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("pitchboard").join("config.json")))
}

pub fn load_config(explicit: Option<&Path>) -> AppResult<EditorConfig> {
    match config_path(explicit) {
        Some(path) => Ok(EditorConfig::load(&path)?),
        None => {
            log::warn!("no config directory on this platform, using defaults");
            Ok(EditorConfig::default())
        }
    }
}

fn read(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &[u8]) -> AppResult<()> {
    std::fs::write(path, contents).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn open_editor(
    id: &str,
    json: &str,
    pitch: PitchSpec,
    config: EditorConfig,
) -> (DiagramEditor, RestoreOutcome) {
    let mut editor = DiagramEditor::new(id, pitch, config);
    let outcome = editor.open(json);
    match outcome {
        RestoreOutcome::Restored(n) => log::info!("opened {n} objects on {pitch}"),
        RestoreOutcome::Empty => log::info!("document is empty, pitch only"),
        RestoreOutcome::Malformed => log::warn!("document unreadable, pitch only"),
    }
    (editor, outcome)
}

/// Render a stored diagram to PNG. Unreadable documents render the bare pitch.
pub fn render(
    input: &Path,
    output: &Path,
    pitch: PitchSpec,
    pixel_ratio: Option<f64>,
    config: EditorConfig,
) -> AppResult<RestoreOutcome> {
    let json = read(input)?;
    let ratio = pixel_ratio.unwrap_or(config.raster_pixel_ratio);
    let (editor, outcome) = open_editor("render", &json, pitch, config);
    let png = SkiaRenderer::new().render_png(editor.canvas(), ratio)?;
    write(output, &png)?;
    log::info!("wrote {} ({} bytes)", output.display(), png.len());
    Ok(outcome)
}

/// Re-lay a diagram drawn for one pitch onto another.
pub fn rescale(
    input: &Path,
    output: &Path,
    from: PitchSpec,
    to: PitchSpec,
    config: EditorConfig,
) -> AppResult<usize> {
    let json = read(input)?;
    let (mut editor, outcome) = open_editor("rescale", &json, from, config);
    if !outcome.is_restored() {
        return Err(AppError::NoDiagram {
            action: "rescale",
            path: input.to_path_buf(),
        });
    }
    let moved = match editor.set_pitch(to) {
        RestoreOutcome::Restored(n) => n,
        _ => 0,
    };
    let rescaled = persistence::serialize(editor.canvas())?;
    write(output, rescaled.as_bytes())?;
    Ok(moved)
}

/// Run the full save flow for a diagram file into a directory store.
/// Returns the preview reference.
pub fn save(
    input: &Path,
    store: &FileStorage,
    id: &str,
    pitch: PitchSpec,
    config: EditorConfig,
) -> AppResult<String> {
    let json = read(input)?;
    let (mut editor, outcome) = open_editor(id, &json, pitch, config);
    if outcome == RestoreOutcome::Malformed {
        return Err(AppError::NoDiagram {
            action: "save",
            path: input.to_path_buf(),
        });
    }
    let url = pollster::block_on(editor.save(store, store, &SkiaRenderer::new()))?;
    Ok(url)
}

/// Stored document ids with their preview reference, if any.
pub fn list(store: &FileStorage) -> AppResult<Vec<(String, Option<String>)>> {
    pollster::block_on(async {
        let mut entries = Vec::new();
        for id in store.list_documents().await? {
            let preview = store.load_preview_reference(&id).await?;
            entries.push((id, preview));
        }
        Ok::<_, AppError>(entries)
    })
}
