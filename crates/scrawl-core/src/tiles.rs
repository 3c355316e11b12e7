//! Tile-based infinite canvas growth.
//!
//! The canvas extent is always a whole number of tiles and only ever grows.
//! Growing on a leading edge (top or left) moves existing content into the
//! new positive range and advances the scroll offset by the same amount so
//! nothing appears to move on screen.

use crate::debounce::Debouncer;
use crate::stroke::Drawing;
use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// One of the four canvas edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// Whether growing this edge shifts existing coordinates.
    pub fn is_leading(self) -> bool {
        matches!(self, Edge::Top | Edge::Left)
    }

    fn index(self) -> usize {
        match self {
            Edge::Top => 0,
            Edge::Bottom => 1,
            Edge::Left => 2,
            Edge::Right => 3,
        }
    }
}

/// Canvas size in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasExtent {
    pub width: u32,
    pub height: u32,
}

impl CanvasExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Smallest whole-tile extent covering a viewport.
    pub fn for_viewport(viewport: Size, tile: u32) -> Self {
        Self {
            width: round_up_to_tile(viewport.width.max(0.0).ceil() as u32, tile),
            height: round_up_to_tile(viewport.height.max(0.0).ceil() as u32, tile),
        }
    }

    /// Round each dimension up to a whole, non-zero number of tiles.
    pub fn normalized(self, tile: u32) -> Self {
        Self {
            width: round_up_to_tile(self.width, tile),
            height: round_up_to_tile(self.height, tile),
        }
    }

    pub fn is_tile_aligned(&self, tile: u32) -> bool {
        tile > 0 && self.width > 0 && self.height > 0 && self.width % tile == 0 && self.height % tile == 0
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

fn round_up_to_tile(value: u32, tile: u32) -> u32 {
    let tile = tile.max(1);
    value.div_ceil(tile).max(1).saturating_mul(tile)
}

/// The visible window onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas coordinate at the viewport's top-left corner.
    pub scroll: Vec2,
    pub size: Size,
}

impl Viewport {
    pub fn new(scroll: Vec2, size: Size) -> Self {
        Self { scroll, size }
    }

    /// Keep the viewport inside the canvas.
    pub fn clamp_to(&mut self, extent: CanvasExtent) {
        let max_x = (extent.width as f64 - self.size.width).max(0.0);
        let max_y = (extent.height as f64 - self.size.height).max(0.0);
        self.scroll.x = self.scroll.x.clamp(0.0, max_x);
        self.scroll.y = self.scroll.y.clamp(0.0, max_y);
    }
}

/// Result of one growth step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Growth {
    pub edge: Edge,
    pub extent: CanvasExtent,
    /// Scroll adjustment the host must apply to keep content still.
    pub scroll_shift: Vec2,
}

/// Owns the canvas extent and the per-edge growth debouncers.
#[derive(Debug, Clone)]
pub struct TileCanvas {
    extent: CanvasExtent,
    tile: u32,
    triggers: [Debouncer; 4],
    /// Edges the viewport was near at the last observation.
    near: [bool; 4],
}

impl TileCanvas {
    pub fn new(extent: CanvasExtent, tile: u32, debounce: Duration) -> Self {
        let tile = tile.max(1);
        Self {
            extent: extent.normalized(tile),
            tile,
            triggers: std::array::from_fn(|_| Debouncer::new(debounce)),
            near: [false; 4],
        }
    }

    pub fn extent(&self) -> CanvasExtent {
        self.extent
    }

    pub fn tile_size(&self) -> u32 {
        self.tile
    }

    /// Edges the viewport is within `margin` of.
    pub fn near_edges(&self, viewport: &Viewport, margin: f64) -> Vec<Edge> {
        let right = viewport.scroll.x + viewport.size.width;
        let bottom = viewport.scroll.y + viewport.size.height;
        Edge::ALL
            .into_iter()
            .filter(|edge| match edge {
                Edge::Top => viewport.scroll.y <= margin,
                Edge::Left => viewport.scroll.x <= margin,
                Edge::Bottom => bottom >= self.extent.height as f64 - margin,
                Edge::Right => right >= self.extent.width as f64 - margin,
            })
            .collect()
    }

    /// Track viewport proximity, signalling each edge the viewport has just
    /// come near. Staying near an edge does not re-arm its timer.
    pub fn observe(&mut self, viewport: &Viewport, margin: f64, now: Instant) -> Vec<Edge> {
        let near = self.near_edges(viewport, margin);
        let mut reached = Vec::new();
        for edge in Edge::ALL {
            let is_near = near.contains(&edge);
            if is_near && !self.near[edge.index()] {
                self.signal(edge, now);
                reached.push(edge);
            }
            self.near[edge.index()] = is_near;
        }
        reached
    }

    /// Report that the viewport is near `edge`. Repeated signals coalesce.
    pub fn signal(&mut self, edge: Edge, now: Instant) {
        self.triggers[edge.index()].schedule(now);
    }

    pub fn has_pending(&self) -> bool {
        self.triggers.iter().any(Debouncer::is_pending)
    }

    /// Grow every edge whose debounce window has elapsed.
    pub fn poll(&mut self, now: Instant, drawing: &mut Drawing, viewport: &mut Viewport) -> Vec<Growth> {
        let due: Vec<Edge> = Edge::ALL
            .into_iter()
            .filter(|edge| self.triggers[edge.index()].fire_if_due(now))
            .collect();
        due.into_iter()
            .map(|edge| self.grow(edge, drawing, viewport))
            .collect()
    }

    /// Grow by one tile on `edge`, remapping content for leading edges.
    pub fn grow(&mut self, edge: Edge, drawing: &mut Drawing, viewport: &mut Viewport) -> Growth {
        let tile = self.tile;
        let step = tile as f64;
        let scroll_shift = match edge {
            Edge::Top => {
                self.extent.height = self.extent.height.saturating_add(tile);
                drawing.translate(0.0, step);
                Vec2::new(0.0, step)
            }
            Edge::Left => {
                self.extent.width = self.extent.width.saturating_add(tile);
                drawing.translate(step, 0.0);
                Vec2::new(step, 0.0)
            }
            Edge::Bottom => {
                self.extent.height = self.extent.height.saturating_add(tile);
                Vec2::ZERO
            }
            Edge::Right => {
                self.extent.width = self.extent.width.saturating_add(tile);
                Vec2::ZERO
            }
        };
        viewport.scroll += scroll_shift;
        // The grown edge is a tile away now; reaching it again is a new signal.
        self.near[edge.index()] = false;
        log::debug!("canvas grew at {:?} to {}x{}", edge, self.extent.width, self.extent.height);

        Growth {
            edge,
            extent: self.extent,
            scroll_shift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{Stroke, StrokePoint};

    const TILE: u32 = 256;
    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn fixture() -> (TileCanvas, Drawing, Viewport) {
        let canvas = TileCanvas::new(CanvasExtent::new(1024, 768), TILE, DEBOUNCE);
        let mut drawing = Drawing::new();
        drawing.push(Stroke::from_points(vec![
            StrokePoint::new(10.0, 20.0, 0.0, 0.5),
            StrokePoint::new(30.0, 40.0, 16.0, 0.5),
        ]));
        let viewport = Viewport::new(Vec2::new(100.0, 100.0), Size::new(800.0, 600.0));
        (canvas, drawing, viewport)
    }

    fn coords(drawing: &Drawing) -> Vec<(f64, f64)> {
        drawing
            .iter()
            .flat_map(|s| s.points.iter().map(|p| (p.x, p.y)))
            .collect()
    }

    #[test]
    fn test_extent_for_viewport() {
        let extent = CanvasExtent::for_viewport(Size::new(1000.0, 10.0), TILE);
        assert_eq!(extent, CanvasExtent::new(1024, 256));
        assert!(extent.is_tile_aligned(TILE));
        assert_eq!(CanvasExtent::for_viewport(Size::ZERO, TILE), CanvasExtent::new(256, 256));
    }

    #[test]
    fn test_normalize_rounds_up() {
        assert_eq!(CanvasExtent::new(300, 512).normalized(TILE), CanvasExtent::new(512, 512));
    }

    #[test]
    fn test_top_growth_shifts_y() {
        let (mut canvas, mut drawing, mut viewport) = fixture();
        let growth = canvas.grow(Edge::Top, &mut drawing, &mut viewport);

        assert_eq!(growth.extent, CanvasExtent::new(1024, 768 + TILE));
        assert_eq!(growth.scroll_shift, Vec2::new(0.0, 256.0));
        assert_eq!(viewport.scroll, Vec2::new(100.0, 356.0));
        assert_eq!(coords(&drawing), vec![(10.0, 276.0), (30.0, 296.0)]);
    }

    #[test]
    fn test_left_growth_shifts_x() {
        let (mut canvas, mut drawing, mut viewport) = fixture();
        canvas.grow(Edge::Left, &mut drawing, &mut viewport);

        assert_eq!(canvas.extent(), CanvasExtent::new(1024 + TILE, 768));
        assert_eq!(viewport.scroll, Vec2::new(356.0, 100.0));
        assert_eq!(coords(&drawing), vec![(266.0, 20.0), (286.0, 40.0)]);
    }

    #[test]
    fn test_trailing_growth_keeps_coordinates() {
        let (mut canvas, mut drawing, mut viewport) = fixture();
        canvas.grow(Edge::Bottom, &mut drawing, &mut viewport);
        canvas.grow(Edge::Right, &mut drawing, &mut viewport);

        assert_eq!(canvas.extent(), CanvasExtent::new(1024 + TILE, 768 + TILE));
        assert_eq!(viewport.scroll, Vec2::new(100.0, 100.0));
        assert_eq!(coords(&drawing), vec![(10.0, 20.0), (30.0, 40.0)]);
    }

    #[test]
    fn test_signals_are_debounced() {
        let (mut canvas, mut drawing, mut viewport) = fixture();
        let start = Instant::now();
        for i in 0..10 {
            canvas.signal(Edge::Top, start + Duration::from_millis(i * 50));
        }

        assert!(canvas.poll(start + Duration::from_millis(900), &mut drawing, &mut viewport).is_empty());
        let grown = canvas.poll(start + Duration::from_millis(950), &mut drawing, &mut viewport);
        assert_eq!(grown.len(), 1);
        assert_eq!(canvas.extent().height, 768 + TILE);
        assert!(!canvas.has_pending());
    }

    #[test]
    fn test_observe_signals_on_arrival_only() {
        let (mut canvas, mut drawing, mut viewport) = fixture();
        let start = Instant::now();
        let at_right = Viewport::new(Vec2::new(224.0, 100.0), Size::new(800.0, 600.0));

        assert_eq!(canvas.observe(&at_right, 64.0, start), vec![Edge::Right]);
        for i in 1..5 {
            assert!(canvas.observe(&at_right, 64.0, start + Duration::from_millis(i * 100)).is_empty());
        }
        let grown = canvas.poll(start + DEBOUNCE, &mut drawing, &mut viewport);
        assert_eq!(grown.len(), 1);
        assert_eq!(grown[0].edge, Edge::Right);

        // Still at the (new) right edge after growing: signalled afresh.
        let at_new_right = Viewport::new(Vec2::new(480.0, 100.0), Size::new(800.0, 600.0));
        assert_eq!(canvas.observe(&at_new_right, 64.0, start + DEBOUNCE), vec![Edge::Right]);
    }

    #[test]
    fn test_leaving_and_returning_resignals() {
        let (mut canvas, _, _) = fixture();
        let start = Instant::now();
        let at_top = Viewport::new(Vec2::new(100.0, 0.0), Size::new(800.0, 600.0));
        let middle = Viewport::new(Vec2::new(100.0, 80.0), Size::new(800.0, 600.0));

        assert_eq!(canvas.observe(&at_top, 64.0, start), vec![Edge::Top]);
        assert!(canvas.observe(&middle, 64.0, start).is_empty());
        assert_eq!(canvas.observe(&at_top, 64.0, start), vec![Edge::Top]);
    }

    #[test]
    fn test_independent_edges_commute() {
        let (mut a, mut drawing_a, mut viewport_a) = fixture();
        let (mut b, mut drawing_b, mut viewport_b) = fixture();

        a.grow(Edge::Top, &mut drawing_a, &mut viewport_a);
        a.grow(Edge::Left, &mut drawing_a, &mut viewport_a);
        b.grow(Edge::Left, &mut drawing_b, &mut viewport_b);
        b.grow(Edge::Top, &mut drawing_b, &mut viewport_b);

        assert_eq!(a.extent(), b.extent());
        assert_eq!(viewport_a, viewport_b);
        assert_eq!(coords(&drawing_a), coords(&drawing_b));
    }

    #[test]
    fn test_near_edges() {
        let (canvas, _, _) = fixture();
        let top_left = Viewport::new(Vec2::ZERO, Size::new(800.0, 600.0));
        assert_eq!(canvas.near_edges(&top_left, 64.0), vec![Edge::Top, Edge::Left]);

        let bottom_right = Viewport::new(Vec2::new(224.0, 168.0), Size::new(800.0, 600.0));
        assert_eq!(canvas.near_edges(&bottom_right, 64.0), vec![Edge::Bottom, Edge::Right]);

        let middle = Viewport::new(Vec2::new(100.0, 80.0), Size::new(800.0, 600.0));
        assert!(canvas.near_edges(&middle, 64.0).is_empty());
    }

    #[test]
    fn test_viewport_clamp() {
        let mut viewport = Viewport::new(Vec2::new(-5.0, 9000.0), Size::new(800.0, 600.0));
        viewport.clamp_to(CanvasExtent::new(1024, 768));
        assert_eq!(viewport.scroll, Vec2::new(0.0, 168.0));
    }
}
