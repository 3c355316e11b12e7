//! Press-and-hold erase.

use super::{ErasePolicy, StrokeOutcome};
use crate::config::EraseMode;
use crate::geometry;
use crate::input::PointerId;
use crate::stroke::{Drawing, Stroke, StrokeId};
use kurbo::Point;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// A running hold on one stroke.
#[derive(Debug, Clone, Copy)]
struct PendingHold {
    pointer: PointerId,
    target: StrokeId,
    fires_at: Instant,
}

/// Deletes a committed stroke once a pointer rests on it for `duration`.
#[derive(Debug, Clone)]
pub struct HoldEraser {
    duration: Duration,
    hit_width: f64,
    pending: Option<PendingHold>,
}

impl HoldEraser {
    pub fn new(duration: Duration, hit_width: f64) -> Self {
        Self {
            duration,
            hit_width,
            pending: None,
        }
    }

    /// Stroke the running hold targets.
    pub fn target(&self) -> Option<StrokeId> {
        self.pending.map(|hold| hold.target)
    }

    fn in_region(&self, stroke: &Stroke, pos: Point) -> bool {
        geometry::distance_to_polyline(&stroke.positions(), pos)
            .is_some_and(|distance| distance <= self.hit_width / 2.0)
    }

    /// Topmost committed stroke whose hit region contains `pos`.
    pub fn hit_test(&self, drawing: &Drawing, pos: Point, exclude: Option<StrokeId>) -> Option<StrokeId> {
        drawing
            .iter()
            .rev()
            .filter(|stroke| Some(stroke.id()) != exclude)
            .find(|stroke| self.in_region(stroke, pos))
            .map(Stroke::id)
    }
}

impl ErasePolicy for HoldEraser {
    fn mode(&self) -> EraseMode {
        EraseMode::Hold
    }

    fn on_press(
        &mut self,
        drawing: &Drawing,
        pointer: PointerId,
        pos: Point,
        in_progress: Option<StrokeId>,
        now: Instant,
    ) {
        if let Some(target) = self.hit_test(drawing, pos, in_progress) {
            log::debug!("hold armed on stroke {}", target);
            self.pending = Some(PendingHold {
                pointer,
                target,
                fires_at: now + self.duration,
            });
        }
    }

    fn on_move(&mut self, drawing: &Drawing, pointer: PointerId, pos: Point) {
        let Some(hold) = self.pending else { return };
        if hold.pointer != pointer {
            return;
        }
        let still_inside = drawing
            .get(hold.target)
            .is_some_and(|stroke| self.in_region(stroke, pos));
        if !still_inside {
            log::debug!("hold on stroke {} left its region", hold.target);
            self.pending = None;
        }
    }

    fn on_release(&mut self, pointer: PointerId) {
        if self.pending.is_some_and(|hold| hold.pointer == pointer) {
            self.pending = None;
        }
    }

    fn finish_stroke(&mut self, _drawing: &mut Drawing, finished: StrokeId) -> StrokeOutcome {
        StrokeOutcome::Committed(finished)
    }

    fn poll(&mut self, now: Instant) -> Option<StrokeId> {
        let hold = self.pending?;
        if now < hold.fires_at {
            return None;
        }
        self.pending = None;
        Some(hold.target)
    }

    fn hit_region_width(&self) -> Option<f64> {
        Some(self.hit_width)
    }
}
