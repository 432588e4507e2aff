//! Renderer trait abstraction.

use pitchboard_core::canvas::Canvas;
use pitchboard_core::pitch::PITCH_COLOR;
use pitchboard_core::raster::RasterResult;
use pitchboard_core::shapes::SerializableColor;

/// Context for a single render pass.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Device pixels per canvas unit.
    pub scale_factor: f64,
    /// Fill behind the pitch markings.
    pub background_color: SerializableColor,
    /// Outline colour for selected annotations.
    pub selection_color: SerializableColor,
    /// Draw selection outlines. Off for exported previews.
    pub show_selection: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            canvas,
            scale_factor: 1.0,
            background_color: SerializableColor::parse(PITCH_COLOR)
                .unwrap_or(SerializableColor::rgb(11, 141, 47)),
            selection_color: SerializableColor::rgb(59, 130, 246), // Blue
            show_selection: false,
        }
    }

    /// Set the scale factor for HiDPI output.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_background(mut self, color: SerializableColor) -> Self {
        self.background_color = color;
        self
    }

    /// Outline the current selection.
    pub fn with_selection(mut self, show: bool) -> Self {
        self.show_selection = show;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Draw a full frame for the context.
    fn build_scene(&mut self, ctx: &RenderContext) -> RasterResult<()>;

    /// Colour used to clear the frame.
    fn background_color(&self, ctx: &RenderContext) -> SerializableColor {
        ctx.background_color
    }
}
