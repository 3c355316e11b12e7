//! The sketch session: single owner of all drawing state.
//!
//! Hosts forward pointer events, viewport changes and a fixed-rate tick.
//! Every timer (edge growth, hold erase, debounced save) is a deadline that
//! [`Session::tick`] polls, so the session never needs a runtime of its own.

use crate::config::{EraseMode, ScrollAxis, SketchConfig};
use crate::erase::{self, ErasePolicy, StrokeOutcome};
use crate::input::{InputCapture, PointerId};
use crate::momentum::MomentumScroller;
use crate::storage::{KeyValueStore, Persistence, SessionDefaults, StorageResult};
use crate::stroke::{Drawing, StrokeId, StrokePoint};
use crate::tiles::{CanvasExtent, Growth, TileCanvas, Viewport};
use kurbo::{Size, Vec2};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// What one [`Session::tick`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Scroll applied by momentum.
    pub scrolled: Vec2,
    /// Stroke removed by a completed hold.
    pub held_erase: Option<StrokeId>,
    /// Canvas growth steps, in edge order.
    pub growth: Vec<Growth>,
    /// Whether the drawing was written to storage.
    pub saved: bool,
}

/// Stored state brought up by a load or a clear.
struct Mounted {
    drawing: Drawing,
    canvas: TileCanvas,
    viewport: Viewport,
    origin: i64,
    recovered: Vec<&'static str>,
}

impl Mounted {
    fn read<S: KeyValueStore>(
        persistence: &Persistence<S>,
        config: &SketchConfig,
        viewport_size: Size,
        now_epoch_ms: i64,
    ) -> StorageResult<Self> {
        let defaults = SessionDefaults {
            extent: CanvasExtent::for_viewport(viewport_size, config.tile_size),
            origin: now_epoch_ms,
        };
        let loaded = persistence.load(defaults)?;

        let canvas = TileCanvas::new(loaded.extent, config.tile_size, config.edge_debounce());
        if canvas.extent() != loaded.extent {
            log::warn!(
                "Stored canvas {}x{} is not tile aligned, growing to {}x{}",
                loaded.extent.width,
                loaded.extent.height,
                canvas.extent().width,
                canvas.extent().height
            );
        }
        persistence.save_extent(canvas.extent())?;
        persistence.save_origin(loaded.origin)?;

        let mut viewport = Viewport::new(Vec2::ZERO, viewport_size);
        viewport.clamp_to(canvas.extent());

        Ok(Self {
            drawing: loaded.drawing,
            canvas,
            viewport,
            origin: loaded.origin,
            recovered: loaded.recovered,
        })
    }
}

/// Runtime state of one sketch session.
pub struct Session<S: KeyValueStore> {
    config: SketchConfig,
    persistence: Persistence<S>,
    drawing: Drawing,
    input: InputCapture,
    eraser: Box<dyn ErasePolicy>,
    canvas: TileCanvas,
    scroller: MomentumScroller,
    viewport: Viewport,
    /// Epoch milliseconds at t = 0.
    origin: i64,
    recovered: Vec<&'static str>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load (or create) the session stored in `store`.
    ///
    /// A first run sizes the canvas to `viewport_size` and starts the clock at
    /// `now_epoch_ms`. Extent and origin are written back immediately.
    pub fn load(store: S, config: SketchConfig, viewport_size: Size, now_epoch_ms: i64) -> StorageResult<Self> {
        let config = config.sanitized();
        let persistence = Persistence::new(store, config.save_debounce());
        let mounted = Mounted::read(&persistence, &config, viewport_size, now_epoch_ms)?;

        Ok(Self {
            eraser: erase::policy_for(&config),
            scroller: MomentumScroller::new(config.momentum_decay, config.sensitivity),
            config,
            persistence,
            drawing: mounted.drawing,
            input: InputCapture::new(),
            canvas: mounted.canvas,
            viewport: mounted.viewport,
            origin: mounted.origin,
            recovered: mounted.recovered,
        })
    }

    /// Wipe the stored session and start over with a fresh origin.
    ///
    /// On a storage error the session is left as it was.
    pub fn clear(&mut self, now_epoch_ms: i64) -> StorageResult<()> {
        self.persistence.clear()?;
        let mounted = Mounted::read(&self.persistence, &self.config, self.viewport.size, now_epoch_ms)?;

        self.drawing = mounted.drawing;
        self.canvas = mounted.canvas;
        self.viewport = mounted.viewport;
        self.origin = mounted.origin;
        self.recovered = mounted.recovered;
        self.input = InputCapture::new();
        self.eraser = erase::policy_for(&self.config);
        self.scroller.stop();
        Ok(())
    }

    /// Write any pending drawing edits now.
    pub fn flush(&mut self) -> StorageResult<()> {
        self.persistence.flush(&self.drawing)
    }

    /// Build a point stamped relative to the session origin.
    pub fn point_at(&self, x: f64, y: f64, pressure: f64, epoch_ms: i64) -> StrokePoint {
        let t = epoch_ms.saturating_sub(self.origin).max(0) as f64;
        StrokePoint::new(x, y, t, pressure)
    }

    /// Pointer pressed. Returns whether it started a stroke.
    pub fn pointer_down(&mut self, id: PointerId, point: StrokePoint, now: Instant) -> bool {
        if !self.input.pointer_down(&mut self.drawing, id, point) {
            return false;
        }
        let in_progress = self.input.in_progress(&self.drawing);
        self.eraser.on_press(&self.drawing, id, point.pos(), in_progress, now);
        self.persistence.mark_drawing_dirty(now);
        true
    }

    /// Pointer moved. Returns whether the point was recorded.
    pub fn pointer_move(&mut self, id: PointerId, point: StrokePoint, now: Instant) -> bool {
        self.eraser.on_move(&self.drawing, id, point.pos());
        let Some(delta) = self.input.pointer_move(&mut self.drawing, id, point) else {
            return false;
        };
        self.feed_momentum(point, delta);
        self.persistence.mark_drawing_dirty(now);
        true
    }

    /// Pointer lifted. Returns the fate of the finished stroke.
    pub fn pointer_up(&mut self, id: PointerId, point: StrokePoint, now: Instant) -> Option<StrokeOutcome> {
        self.eraser.on_release(id);
        let finished = self.input.pointer_up(&mut self.drawing, id, point)?;
        let outcome = self.eraser.finish_stroke(&mut self.drawing, finished);
        log::debug!("stroke finished: {:?}", outcome);
        self.persistence.mark_drawing_dirty(now);
        Some(outcome)
    }

    /// Pointer cancelled. Returns whether a stroke was discarded.
    pub fn pointer_cancel(&mut self, id: PointerId, now: Instant) -> bool {
        self.eraser.on_release(id);
        let discarded = self.input.pointer_cancel(&mut self.drawing, id).is_some();
        if discarded {
            self.persistence.mark_drawing_dirty(now);
        }
        discarded
    }

    /// The host scrolled or resized the view.
    pub fn set_viewport(&mut self, scroll: Vec2, size: Size, now: Instant) {
        self.viewport = Viewport::new(scroll, size);
        self.viewport.clamp_to(self.canvas.extent());
        self.signal_near_edges(now);
    }

    /// Run timers and one momentum frame.
    pub fn tick(&mut self, now: Instant) -> StorageResult<TickReport> {
        let mut report = TickReport::default();

        let step = self.scroller.tick();
        if step != 0 {
            let before = self.viewport.scroll;
            match self.config.scroll_axis {
                ScrollAxis::Horizontal => self.viewport.scroll.x += step as f64,
                ScrollAxis::Vertical => self.viewport.scroll.y += step as f64,
            }
            self.viewport.clamp_to(self.canvas.extent());
            report.scrolled = self.viewport.scroll - before;
            self.signal_near_edges(now);
        }

        if let Some(target) = self.eraser.poll(now) {
            if self.drawing.remove(target).is_some() {
                log::debug!("hold erased stroke {}", target);
                self.input.abandon(&mut self.drawing);
                self.persistence.mark_drawing_dirty(now);
                report.held_erase = Some(target);
            }
        }

        report.growth = self.canvas.poll(now, &mut self.drawing, &mut self.viewport);
        if !report.growth.is_empty() {
            self.persistence.save_extent(self.canvas.extent())?;
            if report.growth.iter().any(|growth| growth.edge.is_leading()) {
                self.persistence.mark_drawing_dirty(now);
            }
        }

        report.saved = self.persistence.flush_if_due(now, &self.drawing)?;
        Ok(report)
    }

    fn feed_momentum(&mut self, point: StrokePoint, delta: Vec2) {
        let (position, extent, movement) = match self.config.scroll_axis {
            ScrollAxis::Horizontal => (point.x - self.viewport.scroll.x, self.viewport.size.width, delta.x),
            ScrollAxis::Vertical => (point.y - self.viewport.scroll.y, self.viewport.size.height, delta.y),
        };
        self.scroller.feed(position, extent, movement);
    }

    fn signal_near_edges(&mut self, now: Instant) {
        let reached = self.canvas.observe(&self.viewport, self.config.edge_margin, now);
        if !reached.is_empty() {
            log::debug!("viewport reached {:?}", reached);
        }
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn extent(&self) -> CanvasExtent {
        self.canvas.extent()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Session origin in epoch milliseconds.
    pub fn origin(&self) -> i64 {
        self.origin
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn erase_mode(&self) -> EraseMode {
        self.eraser.mode()
    }

    pub fn active_pointer(&self) -> Option<PointerId> {
        self.input.active_pointer()
    }

    /// The stroke currently being drawn.
    pub fn in_progress(&self) -> Option<StrokeId> {
        self.input.in_progress(&self.drawing)
    }

    /// Width of per-stroke hit regions, when the erase mode uses them.
    pub fn hit_region_width(&self) -> Option<f64> {
        self.eraser.hit_region_width()
    }

    pub fn scroller(&self) -> &MomentumScroller {
        &self.scroller
    }

    /// Keys that were corrupt on load and reset to defaults.
    pub fn recovered_keys(&self) -> &[&'static str] {
        &self.recovered
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.persistence.is_dirty()
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }
}
