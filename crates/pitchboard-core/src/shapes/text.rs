//! Free text label.

use super::{SerializableColor, ShapeKind, ShapeTrait};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_SIZE: f64 = 18.0;
/// Approximate advance per character, as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.6;
const LINE_HEIGHT: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    pub text: String,
    pub font_size: f64,
    pub fill: SerializableColor,
}

impl TextLabel {
    pub fn new(text: impl Into<String>, fill: SerializableColor) -> Self {
        Self {
            text: text.into(),
            font_size: DEFAULT_FONT_SIZE,
            fill,
        }
    }
}

/// Estimated size of a block of text, one cell per character.
pub fn text_block_size(text: &str, font_size: f64) -> Size {
    let lines = text.lines().count().max(1);
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
    Size::new(
        longest as f64 * font_size * CHAR_WIDTH_FACTOR,
        lines as f64 * font_size * LINE_HEIGHT,
    )
}

/// Ink box of every visible character, anchored at the block's top-left.
pub fn glyph_cells(text: &str, font_size: f64) -> Vec<Rect> {
    let advance = font_size * CHAR_WIDTH_FACTOR;
    let line_height = font_size * LINE_HEIGHT;
    let mut cells = Vec::new();
    for (row, line) in text.lines().enumerate() {
        let top = row as f64 * line_height;
        for (col, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = col as f64 * advance;
            cells.push(Rect::new(
                left + advance * 0.15,
                top + line_height * 0.25,
                left + advance * 0.85,
                top + line_height * 0.85,
            ));
        }
    }
    cells
}

impl ShapeTrait for TextLabel {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Text
    }

    /// Estimated layout box anchored at the top-left.
    fn local_bounds(&self) -> Rect {
        text_block_size(&self.text, self.font_size).to_rect()
    }

    fn hit_test_local(&self, point: Point, tolerance: f64) -> bool {
        self.local_bounds().inflate(tolerance, tolerance).contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_grow_with_text() {
        let mut label = TextLabel::new("Text", SerializableColor::white());
        let short = label.local_bounds();
        label.text = "Overlap run\nline two".to_string();
        let long = label.local_bounds();
        assert!(long.width() > short.width());
        assert!(long.height() > short.height());
    }

    #[test]
    fn test_glyph_cells_skip_spaces() {
        let cells = glyph_cells("a b\nc", 10.0);
        assert_eq!(cells.len(), 3);
        assert!(cells[1].x0 > cells[0].x1);
        assert!(cells[2].y0 >= 12.0);
        let block = text_block_size("a b\nc", 10.0).to_rect();
        assert!(cells.iter().all(|c| block.contains(Point::new(c.x0, c.y0))));
    }

    #[test]
    fn test_empty_text_still_hittable() {
        let label = TextLabel::new("", SerializableColor::white());
        assert!(label.hit_test_local(Point::new(2.0, 2.0), 0.0));
    }
}
