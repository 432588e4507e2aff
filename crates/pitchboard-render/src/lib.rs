//! Pitchboard Render Library
//!
//! Renderer abstraction and the tiny-skia implementation used to produce
//! PNG previews of Pitchboard diagrams.

mod renderer;
mod skia;

pub use renderer::{RenderContext, Renderer};
pub use skia::SkiaRenderer;
