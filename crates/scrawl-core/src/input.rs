//! Pointer capture: turns raw pointer events into stroke edits.
//!
//! Exactly one pointer may draw at a time. Events from any other pointer are
//! dropped without touching the drawing.

use crate::stroke::{Drawing, Stroke, StrokeId, StrokePoint};
use kurbo::Vec2;

/// Platform pointer identifier.
pub type PointerId = i32;

/// Tracks which pointer, if any, is currently drawing.
#[derive(Debug, Clone, Default)]
pub struct InputCapture {
    active: Option<PointerId>,
}

impl InputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pointer currently drawing.
    pub fn active_pointer(&self) -> Option<PointerId> {
        self.active
    }

    /// Whether a stroke is in progress (it is always the drawing's last).
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Id of the in-progress stroke.
    pub fn in_progress(&self, drawing: &Drawing) -> Option<StrokeId> {
        self.active.and(drawing.last().map(Stroke::id))
    }

    /// Start a stroke. Returns false if another pointer is already drawing.
    pub fn pointer_down(&mut self, drawing: &mut Drawing, id: PointerId, point: StrokePoint) -> bool {
        if self.active.is_some() {
            log::debug!("ignoring pointer {} down, pointer {:?} is drawing", id, self.active);
            return false;
        }
        drawing.push(Stroke::new(point));
        self.active = Some(id);
        true
    }

    /// Extend the stroke. Returns the movement since the previous point when
    /// the event belongs to the drawing pointer.
    pub fn pointer_move(&mut self, drawing: &mut Drawing, id: PointerId, point: StrokePoint) -> Option<Vec2> {
        self.append(drawing, id, point)
    }

    /// Finish the stroke with a final point and release the pointer.
    ///
    /// Returns the id of the finished stroke, still sitting on top of the
    /// drawing, so the erase policy can decide its fate.
    pub fn pointer_up(&mut self, drawing: &mut Drawing, id: PointerId, point: StrokePoint) -> Option<StrokeId> {
        self.append(drawing, id, point)?;
        self.active = None;
        drawing.last().map(Stroke::id)
    }

    /// Abort the stroke of the drawing pointer, removing it entirely.
    pub fn pointer_cancel(&mut self, drawing: &mut Drawing, id: PointerId) -> Option<Stroke> {
        if self.active != Some(id) {
            return None;
        }
        self.abandon(drawing)
    }

    /// Drop whatever stroke is in progress regardless of pointer.
    pub fn abandon(&mut self, drawing: &mut Drawing) -> Option<Stroke> {
        self.active.take()?;
        drawing.pop()
    }

    fn append(&mut self, drawing: &mut Drawing, id: PointerId, point: StrokePoint) -> Option<Vec2> {
        if self.active != Some(id) {
            return None;
        }
        let stroke = drawing.last_mut()?;
        let delta = stroke
            .points
            .last()
            .map(|last| point.pos() - last.pos())
            .unwrap_or(Vec2::ZERO);
        stroke.push(point);
        Some(delta)
    }
}
