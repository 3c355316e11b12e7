//! Renderer trait abstraction.

use peniko::Color;
use scrawl_core::{Drawing, KeyValueStore, Session, StrokeId, StrokePoint};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// How a polyline is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolylineStyle {
    /// Visible ink.
    Ink,
    /// Invisible, pointer-hittable band of the given width around a stroke.
    HitRegion { width: f64 },
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Strokes in z-order.
    pub drawing: &'a Drawing,
    /// Stroke still being drawn. Never gets a hit region.
    pub in_progress: Option<StrokeId>,
    /// Hit region width, when the erase mode uses hit regions.
    pub hit_region_width: Option<f64>,
    /// Background color.
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(drawing: &'a Drawing) -> Self {
        Self {
            drawing,
            in_progress: None,
            hit_region_width: None,
            background_color: Color::WHITE,
        }
    }

    /// Snapshot of a live session.
    pub fn for_session<S: KeyValueStore>(session: &'a Session<S>) -> Self {
        Self::new(session.drawing())
            .with_in_progress(session.in_progress())
            .with_hit_regions(session.hit_region_width())
    }

    pub fn with_in_progress(mut self, stroke: Option<StrokeId>) -> Self {
        self.in_progress = stroke;
        self
    }

    pub fn with_hit_regions(mut self, width: Option<f64>) -> Self {
        self.hit_region_width = width;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Trait for rendering backends.
///
/// The engine only ever asks for an ordered list of points to be drawn as a
/// polyline; how that lands on screen is up to the backend.
pub trait Renderer: Send {
    /// Fill the whole surface.
    fn clear(&mut self, color: Color);

    /// Draw one polyline. A single point is drawn as a dot.
    fn draw_polyline(&mut self, points: &[StrokePoint], style: PolylineStyle);
}

/// Paint a full frame: background, then every stroke bottom to top.
pub fn render_frame<R: Renderer + ?Sized>(renderer: &mut R, ctx: &RenderContext) {
    renderer.clear(ctx.background_color);
    for stroke in ctx.drawing.iter() {
        renderer.draw_polyline(&stroke.points, PolylineStyle::Ink);
        match ctx.hit_region_width {
            Some(width) if ctx.in_progress != Some(stroke.id()) => {
                renderer.draw_polyline(&stroke.points, PolylineStyle::HitRegion { width });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use scrawl_core::{MemoryStore, SketchConfig, Stroke};
    use std::time::Instant;

    #[derive(Default)]
    struct Recorder {
        cleared: usize,
        calls: Vec<(usize, PolylineStyle)>,
    }

    impl Renderer for Recorder {
        fn clear(&mut self, _color: Color) {
            self.cleared += 1;
        }

        fn draw_polyline(&mut self, points: &[StrokePoint], style: PolylineStyle) {
            self.calls.push((points.len(), style));
        }
    }

    fn stroke(len: usize) -> Stroke {
        Stroke::from_points((0..len).map(|i| StrokePoint::new(i as f64, 0.0, i as f64, 0.5)).collect())
    }

    #[test]
    fn test_ink_in_z_order() {
        let mut drawing = Drawing::new();
        drawing.push(stroke(1));
        drawing.push(stroke(3));

        let mut recorder = Recorder::default();
        render_frame(&mut recorder, &RenderContext::new(&drawing));
        assert_eq!(recorder.cleared, 1);
        assert_eq!(recorder.calls, vec![(1, PolylineStyle::Ink), (3, PolylineStyle::Ink)]);
    }

    #[test]
    fn test_hit_regions_skip_in_progress() {
        let mut drawing = Drawing::new();
        drawing.push(stroke(2));
        drawing.push(stroke(4));
        let live = drawing.last().map(Stroke::id);

        let ctx = RenderContext::new(&drawing)
            .with_in_progress(live)
            .with_hit_regions(Some(24.0));
        let mut recorder = Recorder::default();
        render_frame(&mut recorder, &ctx);

        let hit = PolylineStyle::HitRegion { width: 24.0 };
        assert_eq!(
            recorder.calls,
            vec![(2, PolylineStyle::Ink), (2, hit), (4, PolylineStyle::Ink)]
        );
    }

    #[test]
    fn test_session_context_follows_erase_mode() {
        let now = Instant::now();
        let mut session = Session::load(MemoryStore::new(), SketchConfig::hold(), Size::new(400.0, 300.0), 0).unwrap();
        session.pointer_down(1, StrokePoint::new(5.0, 5.0, 0.0, 0.5), now);

        let ctx = RenderContext::for_session(&session);
        assert_eq!(ctx.hit_region_width, Some(24.0));
        assert_eq!(ctx.in_progress, session.in_progress());

        let lasso = Session::load(MemoryStore::new(), SketchConfig::lasso(), Size::new(400.0, 300.0), 0).unwrap();
        assert_eq!(RenderContext::for_session(&lasso).hit_region_width, None);
    }
}
