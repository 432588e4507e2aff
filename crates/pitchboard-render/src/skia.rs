//! CPU renderer backed by tiny-skia, used for PNG previews.

use crate::renderer::{RenderContext, Renderer};
use kurbo::{Affine, BezPath, PathEl, Point, Rect};
use pitchboard_core::canvas::{Canvas, SceneObject};
use pitchboard_core::pitch::{BackgroundMark, MARK_COLOR, MARK_STROKE_WIDTH, MarkGeometry};
use pitchboard_core::raster::{RasterError, RasterResult, Rasterizer, raster_size};
use pitchboard_core::shapes::{
    Annotation, ArrowOrLine, BALL_STROKE_WIDTH, Ball, CONE_STROKE_WIDTH, Cone, FreehandStroke,
    MARKER_STROKE_WIDTH, Marker, MarkerPart, PLAYER_STROKE_WIDTH, PlayerPart, PlayerToken,
    SerializableColor, Shape, TextLabel, glyph_cells, text_block_size,
};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, StrokeDash,
    Transform,
};

const SELECTION_PADDING: f64 = 4.0;
const SELECTION_STROKE_WIDTH: f64 = 1.5;
const SELECTION_DASH: [f64; 2] = [4.0, 3.0];

/// tiny-skia renderer. Holds the last frame it drew.
#[derive(Default)]
pub struct SkiaRenderer {
    pixmap: Option<Pixmap>,
}

fn color(c: SerializableColor) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn paint(c: SerializableColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color(c));
    paint.anti_alias = true;
    paint
}

fn to_skia(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// tiny-skia needs an even dash list, so an odd one is repeated.
fn dash(pattern: &[f64]) -> Option<StrokeDash> {
    let mut intervals: Vec<f32> = pattern.iter().map(|&v| v as f32).collect();
    if intervals.len() % 2 == 1 {
        intervals.extend_from_within(..);
    }
    StrokeDash::new(intervals, 0.0)
}

fn stroke(width: f64, pattern: Option<&[f64]>) -> Stroke {
    Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash: pattern.and_then(dash),
        ..Stroke::default()
    }
}

fn polyline_path(points: &[Point], close: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

fn circle_path(center: Point, radius: f64) -> Option<Path> {
    PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
}

fn rect_path(rect: Rect) -> Option<Path> {
    tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
        .map(PathBuilder::from_rect)
}

fn bez_to_path(bez: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in bez.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Encode straight RGBA rows as PNG.
fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RasterResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RasterError::Encode(format!("header: {e}")))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| RasterError::Encode(format!("data: {e}")))?;
    }
    Ok(png_data)
}

/// Pixmap bytes are premultiplied; PNG wants straight alpha.
fn demultiplied_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

impl SkiaRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last frame drawn by [`Renderer::build_scene`].
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    pub fn take_pixmap(&mut self) -> Option<Pixmap> {
        self.pixmap.take()
    }

    fn fill_shape(
        pixmap: &mut Pixmap,
        path: Option<Path>,
        c: SerializableColor,
        transform: Transform,
    ) {
        if let Some(path) = path {
            pixmap.fill_path(&path, &paint(c), FillRule::Winding, transform, None);
        }
    }

    fn stroke_shape(
        pixmap: &mut Pixmap,
        path: Option<Path>,
        c: SerializableColor,
        style: &Stroke,
        transform: Transform,
    ) {
        if let Some(path) = path {
            pixmap.stroke_path(&path, &paint(c), style, transform, None);
        }
    }

    fn render_mark(pixmap: &mut Pixmap, mark: &BackgroundMark, transform: Transform) {
        let ink = SerializableColor::parse(MARK_COLOR).unwrap_or(SerializableColor::white());
        let line = stroke(MARK_STROKE_WIDTH, None);
        let path = match &mark.geometry {
            MarkGeometry::Spot { center, radius } => {
                Self::fill_shape(pixmap, circle_path(*center, *radius), ink, transform);
                return;
            }
            MarkGeometry::Line { start, end } => polyline_path(&[*start, *end], false),
            MarkGeometry::Rect(rect) => rect_path(*rect),
            MarkGeometry::Circle { center, radius } => circle_path(*center, *radius),
            MarkGeometry::Polyline(points) => polyline_path(points, false),
        };
        Self::stroke_shape(pixmap, path, ink, &line, transform);
    }

    /// Character boxes stand in for glyphs.
    // TODO: rasterize real glyph outlines once a font backend is added to the stack.
    fn render_glyphs(
        pixmap: &mut Pixmap,
        text: &str,
        font_size: f64,
        origin: Point,
        c: SerializableColor,
        transform: Transform,
    ) {
        for cell in glyph_cells(text, font_size) {
            Self::fill_shape(pixmap, rect_path(cell + origin.to_vec2()), c, transform);
        }
    }

    fn render_player(pixmap: &mut Pixmap, player: &PlayerToken, transform: Transform) {
        let body = circle_path(Point::ZERO, player.radius);
        Self::fill_shape(pixmap, body.clone(), player.part_fill(PlayerPart::Body), transform);
        let outline = stroke(PLAYER_STROKE_WIDTH, None);
        Self::stroke_shape(pixmap, body, player.stroke, &outline, transform);

        let block = text_block_size(&player.label, player.font_size);
        let origin = Point::new(-block.width / 2.0, -block.height / 2.0);
        let ink = player.part_fill(PlayerPart::Label);
        Self::render_glyphs(pixmap, &player.label, player.font_size, origin, ink, transform);
    }

    fn render_ball(pixmap: &mut Pixmap, ball: &Ball, transform: Transform) {
        let body = circle_path(Point::ZERO, ball.radius);
        Self::fill_shape(pixmap, body.clone(), ball.fill, transform);
        for patch in ball.patches() {
            Self::fill_shape(pixmap, polyline_path(&patch, true), ball.patch_color, transform);
        }
        Self::stroke_shape(pixmap, body, ball.stroke, &stroke(BALL_STROKE_WIDTH, None), transform);
    }

    fn render_cone(pixmap: &mut Pixmap, cone: &Cone, transform: Transform) {
        let tri = polyline_path(&cone.triangle(), true);
        Self::fill_shape(pixmap, tri.clone(), cone.fill, transform);
        Self::stroke_shape(pixmap, tri, cone.stroke, &stroke(CONE_STROKE_WIDTH, None), transform);
    }

    fn render_marker(pixmap: &mut Pixmap, marker: &Marker, transform: Transform) {
        for part in MarkerPart::ALL {
            let path = circle_path(Point::ZERO, marker.part_radius(part));
            Self::fill_shape(pixmap, path.clone(), marker.part_fill(part), transform);
            if part == MarkerPart::Body {
                let outline = stroke(MARKER_STROKE_WIDTH, None);
                Self::stroke_shape(pixmap, path, marker.stroke, &outline, transform);
            }
        }
    }

    fn render_line(pixmap: &mut Pixmap, line: &ArrowOrLine, transform: Transform) {
        let shaft = stroke(line.stroke_width, line.stroke_dash_array.as_deref());
        let path = polyline_path(&line.shaft_points(), false);
        Self::stroke_shape(pixmap, path, line.stroke, &shaft, transform);
        for head in line.heads(1.0) {
            Self::fill_shape(pixmap, polyline_path(&head.polygon(), true), line.stroke, transform);
        }
    }

    fn render_freehand(pixmap: &mut Pixmap, stroke_shape: &FreehandStroke, transform: Transform) {
        if stroke_shape.is_empty() {
            return;
        }
        let style = stroke(stroke_shape.stroke_width, None);
        let path = bez_to_path(&stroke_shape.to_bez_path());
        Self::stroke_shape(pixmap, path, stroke_shape.stroke, &style, transform);
    }

    fn render_text(pixmap: &mut Pixmap, label: &TextLabel, transform: Transform) {
        let origin = Point::ZERO;
        Self::render_glyphs(pixmap, &label.text, label.font_size, origin, label.fill, transform);
    }

    fn render_annotation(pixmap: &mut Pixmap, annotation: &Annotation, base: Affine) {
        let transform = to_skia(base * annotation.affine());
        match &annotation.shape {
            Shape::Player(s) => Self::render_player(pixmap, s, transform),
            Shape::Ball(s) => Self::render_ball(pixmap, s, transform),
            Shape::Cone(s) => Self::render_cone(pixmap, s, transform),
            Shape::Marker(s) => Self::render_marker(pixmap, s, transform),
            Shape::Arrow(s) => Self::render_line(pixmap, s, transform),
            Shape::Freehand(s) => Self::render_freehand(pixmap, s, transform),
            Shape::Text(s) => Self::render_text(pixmap, s, transform),
        }
    }

    fn render_selection(pixmap: &mut Pixmap, ctx: &RenderContext, base: Affine) {
        let style = stroke(SELECTION_STROKE_WIDTH, Some(&SELECTION_DASH));
        for id in ctx.canvas.selected_ids() {
            if let Some(annotation) = ctx.canvas.annotation(id) {
                let bounds = annotation
                    .bounds()
                    .inflate(SELECTION_PADDING, SELECTION_PADDING);
                let color = ctx.selection_color;
                Self::stroke_shape(pixmap, rect_path(bounds), color, &style, to_skia(base));
            }
        }
    }

    fn render_stroke_in_progress(pixmap: &mut Pixmap, canvas: &Canvas, base: Affine) {
        let Some(brush) = canvas.drawing_mode() else {
            return;
        };
        let points = canvas.stroke_in_progress();
        if points.len() > 1 {
            let style = stroke(brush.width, None);
            let path = polyline_path(points, false);
            Self::stroke_shape(pixmap, path, brush.color, &style, to_skia(base));
        }
    }
}

impl Renderer for SkiaRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RasterResult<()> {
        let (width, height) = raster_size(ctx.canvas, ctx.scale_factor)?;
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RasterError::InvalidSize { width, height })?;
        pixmap.fill(color(self.background_color(ctx)));

        let base = Affine::scale(ctx.scale_factor);
        let mut drawn = 0usize;
        for object in ctx.canvas.document.objects_ordered() {
            match object {
                SceneObject::Background(mark) => {
                    Self::render_mark(&mut pixmap, mark, to_skia(base))
                }
                SceneObject::Annotation(annotation) => {
                    Self::render_annotation(&mut pixmap, annotation, base)
                }
            }
            drawn += 1;
        }
        Self::render_stroke_in_progress(&mut pixmap, ctx.canvas, base);
        if ctx.show_selection {
            Self::render_selection(&mut pixmap, ctx, base);
        }
        log::debug!("rendered {drawn} objects at {width}x{height}");

        self.pixmap = Some(pixmap);
        Ok(())
    }
}

impl Rasterizer for SkiaRenderer {
    fn render_png(&self, canvas: &Canvas, pixel_ratio: f64) -> RasterResult<Vec<u8>> {
        let ctx = RenderContext::new(canvas).with_scale_factor(pixel_ratio);
        let mut frame = SkiaRenderer::new();
        frame.build_scene(&ctx)?;
        let pixmap = frame.take_pixmap().ok_or(RasterError::Encode(
            "renderer produced no frame".to_string(),
        ))?;
        encode_png(&demultiplied_rgba(&pixmap), pixmap.width(), pixmap.height())
    }
}
