//! CPU raster backend on top of tiny-skia.

use crate::renderer::{PolylineStyle, RenderResult, Renderer, RendererError};
use kurbo::Point;
use peniko::Color;
use scrawl_core::StrokePoint;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Default ink width in canvas units.
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

fn to_skia(color: Color) -> tiny_skia::Color {
    let rgba = color.to_rgba8();
    tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

/// Renders polylines into an off-screen pixmap.
///
/// Canvas coordinates are mapped to pixels by `(p - origin) * zoom`.
pub struct PixmapRenderer {
    pixmap: Pixmap,
    transform: Transform,
    line_width: f64,
    ink: Color,
}

impl PixmapRenderer {
    /// Allocate a `width` x `height` pixel surface.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RendererError::Surface(format!("Failed to allocate {}x{} pixmap", width, height))
        })?;
        Ok(Self {
            pixmap,
            transform: Transform::identity(),
            line_width: DEFAULT_LINE_WIDTH,
            ink: Color::BLACK,
        })
    }

    /// Place canvas point `origin` at the top-left pixel, scaled by `zoom`.
    pub fn with_view(mut self, origin: Point, zoom: f64) -> Self {
        let zoom = zoom as f32;
        self.transform = Transform::from_row(
            zoom,
            0.0,
            0.0,
            zoom,
            -(origin.x as f32) * zoom,
            -(origin.y as f32) * zoom,
        );
        self
    }

    /// Ink width in canvas units; the view zoom scales it.
    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn with_ink(mut self, color: Color) -> Self {
        self.ink = color;
        self
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight (non-premultiplied) RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Straight RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for pixel in self.pixmap.pixels() {
            let color = pixel.demultiply();
            rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        rgba
    }

    fn paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(to_skia(self.ink));
        paint.anti_alias = true;
        paint
    }

    fn draw_dot(&mut self, center: &StrokePoint) {
        let radius = (self.line_width / 2.0) as f32;
        let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) else {
            return;
        };
        let paint = self.paint();
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
    }
}

impl Renderer for PixmapRenderer {
    fn clear(&mut self, color: Color) {
        self.pixmap.fill(to_skia(color));
    }

    fn draw_polyline(&mut self, points: &[StrokePoint], style: PolylineStyle) {
        if let PolylineStyle::HitRegion { .. } = style {
            return;
        }
        let (first, rest) = match points.split_first() {
            Some(split) => split,
            None => return,
        };
        if rest.is_empty() {
            self.draw_dot(first);
            return;
        }

        let mut builder = PathBuilder::new();
        builder.move_to(first.x as f32, first.y as f32);
        for point in rest {
            builder.line_to(point.x as f32, point.y as f32);
        }
        let Some(path) = builder.finish() else {
            log::debug!("skipping degenerate polyline of {} points", points.len());
            return;
        };

        let stroke = Stroke {
            width: self.line_width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        let paint = self.paint();
        self.pixmap
            .stroke_path(&path, &paint, &stroke, self.transform, None);
    }
}
