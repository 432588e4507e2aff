//! Rasterization seam used by the save flow.

use crate::canvas::Canvas;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Cannot rasterize a {width}x{height} image")]
    InvalidSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

pub type RasterResult<T> = Result<T, RasterError>;

/// Produces a PNG image of a canvas.
pub trait Rasterizer {
    /// Render at `pixel_ratio` device pixels per canvas unit.
    fn render_png(&self, canvas: &Canvas, pixel_ratio: f64) -> RasterResult<Vec<u8>>;
}

/// Pixel dimensions of a canvas at a given density.
pub fn raster_size(canvas: &Canvas, pixel_ratio: f64) -> RasterResult<(u32, u32)> {
    let size = canvas.size() * pixel_ratio;
    let (width, height) = (size.width.round(), size.height.round());
    if !(width >= 1.0 && height >= 1.0 && width <= u32::MAX as f64 && height <= u32::MAX as f64) {
        return Err(RasterError::InvalidSize {
            width: width.max(0.0) as u32,
            height: height.max(0.0) as u32,
        });
    }
    Ok((width as u32, height as u32))
}
